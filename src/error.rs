//! Error types for content-guardrails

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, GuardError>;

/// Errors raised by the gate and its helpers
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid hook event: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid policy file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("path {0} is outside the scan root")]
    PathOutsideRoot(PathBuf),

    #[error("{0} is not a regular file")]
    NotAFile(PathBuf),
}

impl GuardError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GuardError::Io {
            path: path.into(),
            source,
        }
    }
}
