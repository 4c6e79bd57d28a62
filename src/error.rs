// src/error.rs

//! Crate-wide error type and result alias

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Download error: {0}")]
    DownloadError(String),

    #[error("Unresolved variable '%({0})s' in template")]
    UnresolvedVariable(String),

    #[error("Invalid specifier '{0}': {1}")]
    InvalidSpecifier(String, String),

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("Import check failed: {0}")]
    ImportCheckFailed(String),
}
