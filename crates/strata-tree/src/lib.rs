//! Configuration tree model for Strata
//!
//! A configuration tree is a `serde_json::Value` whose root is a mapping.
//! Mappings keep insertion order. This crate provides:
//!
//! - [`loader`] - reading YAML, JSON or TOML documents into trees
//! - [`path`] - dotted addressing: read, subtree and write forms
//! - [`kind`] - [`ValueKind`], the fine-grained classification of nodes

pub mod error;
pub mod kind;
pub mod loader;
pub mod path;

pub use error::{Error, Result};
pub use kind::ValueKind;
pub use loader::{Format, load, parse_str, to_json_string_pretty, to_yaml_string};
pub use path::{Address, PathSegment, SetMode, leaves, resolve, resolve_higher, set_value};
pub use serde_json::{Map, Value};
