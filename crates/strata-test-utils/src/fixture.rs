//! [`ConfigDir`] builder for layered configuration scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory of configuration documents.
///
/// # Example
///
/// ```rust
/// use strata_test_utils::ConfigDir;
///
/// let dir = ConfigDir::new();
/// let base = dir.write("base.yaml", "db:\n  host: postgres\n");
/// dir.write("main.yaml", "preloads: [base.yaml]\ndb:\n  port: 5432\n");
/// assert!(base.is_file());
/// ```
pub struct ConfigDir {
    temp_dir: TempDir,
}

impl Default for ConfigDir {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigDir {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `name` inside the directory, whether or not it exists.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// Write `contents` to `name`, creating parent directories, and return
    /// the absolute path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents)
            .unwrap_or_else(|e| panic!("ConfigDir::write: failed to write {name}: {e}"));
        path
    }

    /// Write the two-level scenario used throughout the test suites:
    /// `base.yaml` holds the database host and `main.yaml` preloads it.
    ///
    /// Returns the path of `main.yaml`.
    pub fn write_preload_scenario(&self) -> PathBuf {
        self.write(
            "base.yaml",
            "\
db:
  postgres_host: postgres
  postgres_port: 5432
option1: from_base
",
        );
        self.write(
            "main.yaml",
            "\
preloads:
  - base.yaml
option1: test1
many_options:
  sub1: subtest1
  sub2: subtest2
three_numbers: [1, 2, 3]
db:
  postgres_password: X
",
        )
    }
}
