//! Error types for papers.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level result type for papers operations.
pub type Result<T> = std::result::Result<T, PapersError>;

/// Top-level error type for papers.
#[derive(Debug, Error)]
pub enum PapersError {
    #[error("invalid citekey: {0:?}")]
    InvalidCitekey(String),

    #[error("citekey already exists in repository: {0}")]
    DuplicateCitekey(String),

    #[error("no paper with reference {0}")]
    ReferenceNotFound(String),

    #[error("paper not in repository, add it first: {0}")]
    NotRegistered(String),

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("cannot create directory {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("config error: {0}")]
    Config(String),
}

impl PapersError {
    /// Whether this error means "the thing asked for does not exist", as
    /// opposed to a structural or I/O failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::ReferenceNotFound(_))
    }
}
