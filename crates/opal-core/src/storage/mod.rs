pub mod models;
pub mod queries;
pub mod sqlite;

pub use sqlite::ContentStore;
