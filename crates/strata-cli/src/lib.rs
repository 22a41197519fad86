//! Command-line overrides for Strata configuration trees
//!
//! Every leaf of a resolved tree can be overridden from the command line.
//! [`overrides::describe`] lists the flags a tree supports, and
//! [`OverrideAdapter`] registers them on a caller-owned `clap::Command`,
//! then writes parsed values back into the tree, keeping each leaf's kind.
//!
//! ```
//! use clap::Command;
//! use serde_json::json;
//! use strata_cli::OverrideAdapter;
//!
//! let mut tree = json!({"option1": "test1", "three_numbers": [1, 2, 3]});
//! let mut adapter = OverrideAdapter::from_tree(&tree);
//!
//! let command = adapter.augment(Command::new("app"));
//! let matches = command.get_matches_from(["app", "--three_numbers", "4", "5"]);
//!
//! assert_eq!(adapter.apply(&mut tree, &matches)?, 1);
//! assert_eq!(tree["three_numbers"], json!([4, 5]));
//! # Ok::<(), strata_cli::Error>(())
//! ```

pub mod error;
pub mod overrides;

pub use error::{Error, Result};
pub use overrides::{FlagKind, FlagSpec, OverrideAdapter, ScalarKind, describe};
