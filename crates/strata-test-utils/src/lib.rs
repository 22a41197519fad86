//! Shared test utilities for the Strata workspace.
//!
//! A dev-dependency only, never published.
//!
//! - [`fixture`] - [`ConfigDir`], a temporary directory of configuration
//!   documents

pub mod fixture;

pub use fixture::ConfigDir;
