//! Error types for strata-tree

use std::path::PathBuf;

/// Result type for strata-tree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or addressing a configuration tree
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot read configuration document {path}: {source}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} document {path}: {message}")]
    Parse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Field {address} doesn't exist: {reason}")]
    PathNotFound { address: String, reason: String },

    #[error("Cannot set {address}: {reason}")]
    InvalidSet { address: String, reason: String },

    #[error("Failed to serialize tree as {format}: {message}")]
    Serialize { format: String, message: String },
}

impl Error {
    pub fn not_found(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::NotFound {
            path: path.into(),
            source,
        }
    }

    pub fn parse(
        path: impl Into<PathBuf>,
        format: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            path: path.into(),
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn path_not_found(address: impl ToString, reason: impl Into<String>) -> Self {
        Self::PathNotFound {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_set(address: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidSet {
            address: address.to_string(),
            reason: reason.into(),
        }
    }
}
