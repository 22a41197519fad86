//! Error types for strata-cli

/// Result type for override operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while deriving or applying command-line overrides
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error from strata-core
    #[error(transparent)]
    Core(#[from] strata_core::Error),

    /// Error from strata-tree
    #[error(transparent)]
    Tree(#[from] strata_tree::Error),

    /// A supplied value can't be converted to the kind of the leaf it
    /// overrides
    #[error("Cannot override {address} with `{value}`: expected {expected}")]
    TypeCoercion {
        address: String,
        value: String,
        expected: String,
    },

    /// Override arguments failed to parse
    #[error(transparent)]
    Clap(#[from] clap::Error),
}

impl Error {
    pub fn coercion(
        address: impl ToString,
        value: impl Into<String>,
        expected: impl ToString,
    ) -> Self {
        Self::TypeCoercion {
            address: address.to_string(),
            value: value.into(),
            expected: expected.to_string(),
        }
    }
}
