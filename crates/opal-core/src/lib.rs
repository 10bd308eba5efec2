pub mod config;
pub mod counter;
pub mod dedup;
pub mod detector;
pub mod engine;
pub mod error;
pub mod fix;
pub mod frontmatter;
pub mod indexer;
pub mod note;
pub mod progress;
pub mod storage;
pub mod sync;
pub mod validate;
pub mod vault;

pub use config::AppConfig;
pub use detector::{ChangeDetector, NoteState};
pub use engine::{OpalEngine, RunResult};
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
pub use storage::ContentStore;
pub use sync::{RecordKind, SyncPipeline, SyncReport};
pub use validate::{IntegrityError, ValidationReport, VaultValidator};
pub use vault::Vault;
