//! Layered configuration resolution for Strata
//!
//! - [`merge`] - leaf-level merging of trees in three modes
//! - [`preload`] - expansion of `preloads` and post-load directives
//! - [`env`] - `${NAME}` substitution in document locators
//! - [`context`] - [`ConfigContext`], the lazily loaded configuration
//! - [`global`] - an optional process-wide context
//!
//! # Example
//!
//! ```no_run
//! use strata_core::{ConfigContext, ConfigSource};
//!
//! let mut ctx = ConfigContext::new(ConfigSource::explicit("config/main.yaml"));
//! let host = ctx.get()?.value("db.postgres_host")?.clone();
//! # Ok::<(), strata_core::Error>(())
//! ```

pub mod context;
pub mod env;
pub mod error;
pub mod global;
pub mod merge;
pub mod preload;

pub use context::{Config, ConfigContext, ConfigSource, DEFAULT_ENV_VAR};
pub use env::Environment;
pub use error::{Error, Result};
pub use merge::{MergeMode, merge, merge_all, merge_in_place};
pub use preload::Expander;
