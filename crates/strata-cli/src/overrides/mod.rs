//! Deriving command-line flags from a configuration tree
//!
//! Split in two phases: [`describe`] walks a tree and lists what can be
//! overridden, and [`OverrideAdapter`] turns that list into `clap`
//! arguments and applies the parsed values.

mod adapter;
mod descriptor;

pub use adapter::OverrideAdapter;
pub use descriptor::{DEFAULT_SEPARATOR, FlagKind, FlagSpec, ScalarKind, describe};
