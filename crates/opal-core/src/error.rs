use std::path::PathBuf;
use thiserror::Error;

use crate::sync::render::RenderError;
use crate::validate::IntegrityError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("Frontmatter error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Invalid note name: {0}")]
    InvalidNoteName(String),

    #[error("No free file name for '{fragment}' in {}", dir.display())]
    NameCollision { dir: PathBuf, fragment: String },
}
