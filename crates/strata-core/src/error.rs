//! Error types for strata-core

use std::path::PathBuf;

/// Result type for strata-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving a layered configuration
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No explicit path was given and the environment variable is unset,
    /// or the chosen document can't be read
    #[error("Configuration not found: {reason}")]
    ConfigurationNotFound { reason: String },

    /// A `${NAME}` placeholder in a preload locator names an unset variable
    #[error("Unresolved environment reference ${{{name}}} in {locator}")]
    UnresolvedEnvReference { name: String, locator: String },

    /// A preload chain revisits a document already being expanded
    #[error("Cyclic preload: {}", format_chain(.chain))]
    CyclicPreload { chain: Vec<PathBuf> },

    /// A reserved directive key holds something other than a list of strings
    #[error("Invalid `{key}` directive: {reason}")]
    InvalidDirective { key: String, reason: String },

    /// An augmenting document tried to change a value that is already set
    #[error("Cannot augment {address}: {reason}")]
    MergeConflict { address: String, reason: String },

    /// A subtree doesn't match the type it was read as
    #[error("Cannot read {address} as {target}: {message}")]
    Deserialize {
        address: String,
        target: &'static str,
        message: String,
    },

    /// Error from strata-tree
    #[error(transparent)]
    Tree(#[from] strata_tree::Error),
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl Error {
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::ConfigurationNotFound {
            reason: reason.into(),
        }
    }

    pub fn conflict(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MergeConflict {
            address: address.into(),
            reason: reason.into(),
        }
    }
}
