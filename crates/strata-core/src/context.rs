//! The configuration context
//!
//! [`ConfigContext`] owns the resolved configuration for one consumer. The
//! first [`get`](ConfigContext::get) locates the main document, expands its
//! preload chain and caches the result; later calls serve the cache until
//! [`reload`](ConfigContext::reload).

use crate::env::Environment;
use crate::error::{Error, Result};
use crate::preload::Expander;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use strata_tree::{Address, SetMode};
use tracing::{debug, info};

/// Environment variable naming the main document when no path is given
pub const DEFAULT_ENV_VAR: &str = "STRATA_CONFIG";

/// Where the main document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A path chosen by the caller
    Explicit(PathBuf),
    /// The path held by an environment variable
    Environment { var: String },
    /// The explicit path when present, else the environment variable
    ExplicitOrEnvironment { path: Option<PathBuf>, var: String },
}

impl Default for ConfigSource {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ConfigSource {
    /// Read the path from [`DEFAULT_ENV_VAR`].
    pub fn from_env() -> Self {
        Self::Environment {
            var: DEFAULT_ENV_VAR.to_string(),
        }
    }

    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self::Explicit(path.into())
    }

    /// Prefer `path` and fall back to [`DEFAULT_ENV_VAR`].
    pub fn explicit_or_env(path: Option<PathBuf>) -> Self {
        Self::ExplicitOrEnvironment {
            path,
            var: DEFAULT_ENV_VAR.to_string(),
        }
    }

    /// Pick the document path, reading variables from `env`.
    fn locate(&self, env: &Environment) -> Result<PathBuf> {
        let from_var = |var: &str| {
            env.get(var)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
                .ok_or_else(|| {
                    Error::not_found(format!(
                        "no path was given and the environment variable {var} is not set"
                    ))
                })
        };

        match self {
            Self::Explicit(path) => Ok(path.clone()),
            Self::Environment { var } => from_var(var),
            Self::ExplicitOrEnvironment {
                path: Some(path), ..
            } => Ok(path.clone()),
            Self::ExplicitOrEnvironment { path: None, var } => from_var(var),
        }
    }
}

/// A resolved configuration tree
///
/// Cloning gives an independent copy: changes to the clone never reach the
/// instance cached by a [`ConfigContext`].
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    tree: Value,
    path: Option<PathBuf>,
}

impl Config {
    /// Wrap a tree that didn't come from a file.
    pub fn from_tree(tree: Value) -> Self {
        Self { tree, path: None }
    }

    /// Load the document at `path` and expand its preload chain.
    ///
    /// The stored path is canonical.
    pub fn load(path: &Path, expander: &Expander) -> Result<Self> {
        let tree = expander.load(path)?;
        let path = dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        Ok(Self {
            tree,
            path: Some(path),
        })
    }

    /// The absolute main document this tree was resolved from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn tree(&self) -> &Value {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Value {
        &mut self.tree
    }

    pub fn into_tree(self) -> Value {
        self.tree
    }

    /// Get the node at a dotted `address`.
    ///
    /// # Errors
    ///
    /// Returns [`strata_tree::Error::PathNotFound`] (wrapped) if the address
    /// doesn't exist.
    pub fn value(&self, address: &str) -> Result<&Value> {
        Ok(strata_tree::resolve(&self.tree, &Address::parse(address))?)
    }

    /// Get the node at `address`, or `default` when it doesn't exist.
    pub fn value_or(&self, address: &str, default: Value) -> Value {
        self.value(address).cloned().unwrap_or(default)
    }

    /// Read the node at `address` as a `T`.
    ///
    /// ```
    /// use serde::Deserialize;
    /// use serde_json::json;
    /// use strata_core::Config;
    ///
    /// #[derive(Deserialize)]
    /// struct Database {
    ///     postgres_host: String,
    ///     postgres_port: u16,
    /// }
    ///
    /// let config = Config::from_tree(json!({
    ///     "db": {"postgres_host": "postgres", "postgres_port": 5432}
    /// }));
    /// let db: Database = config.value_as("db")?;
    /// assert_eq!(db.postgres_port, 5432);
    /// # Ok::<(), strata_core::Error>(())
    /// ```
    pub fn value_as<T: DeserializeOwned>(&self, address: &str) -> Result<T> {
        let node = self.value(address)?;
        T::deserialize(node).map_err(|e| Error::Deserialize {
            address: address.to_string(),
            target: std::any::type_name::<T>(),
            message: e.to_string(),
        })
    }

    /// Get the mapping at `address`.
    pub fn subtree(&self, address: &str) -> Result<&Map<String, Value>> {
        Ok(strata_tree::resolve_higher(
            &self.tree,
            &Address::parse(address),
        )?)
    }

    /// Write `value` at `address`; see [`strata_tree::set_value`].
    pub fn set_value(
        &mut self,
        address: &str,
        value: impl Into<Value>,
        mode: SetMode,
    ) -> Result<()> {
        strata_tree::set_value(&mut self.tree, &Address::parse(address), value.into(), mode)?;
        Ok(())
    }

    /// Render the tree as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(strata_tree::to_yaml_string(&self.tree)?)
    }
}

/// Owns the lazily loaded configuration for one consumer
///
/// `get`, `get_mut` and `reload` take `&mut self`; sharing a context across
/// threads needs a lock around it (see [`crate::global`]).
#[derive(Debug)]
pub struct ConfigContext {
    source: ConfigSource,
    /// Fixed environment for tests; `None` snapshots the process
    /// environment on every load.
    env: Option<Environment>,
    loaded: Option<Config>,
}

impl ConfigContext {
    pub fn new(source: ConfigSource) -> Self {
        Self {
            source,
            env: None,
            loaded: None,
        }
    }

    /// Create a context that reads variables from `env` instead of the
    /// process environment.
    pub fn with_env(source: ConfigSource, env: Environment) -> Self {
        Self {
            source,
            env: Some(env),
            loaded: None,
        }
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Get the configuration, loading it on first use.
    ///
    /// # Errors
    ///
    /// - [`Error::ConfigurationNotFound`] if no path can be determined or
    ///   the path isn't a file
    /// - any error from loading or expanding the document
    ///
    /// A failed load leaves the context unloaded, so the next call retries.
    pub fn get(&mut self) -> Result<&Config> {
        let config = match self.loaded.take() {
            Some(config) => config,
            None => self.load()?,
        };
        Ok(&*self.loaded.insert(config))
    }

    /// Get the cached configuration mutably, loading it on first use.
    ///
    /// This is where command-line overrides are written back.
    pub fn get_mut(&mut self) -> Result<&mut Config> {
        let config = match self.loaded.take() {
            Some(config) => config,
            None => self.load()?,
        };
        Ok(self.loaded.insert(config))
    }

    /// Discard the cached configuration and load it again.
    pub fn reload(&mut self) -> Result<&Config> {
        if self.loaded.take().is_some() {
            debug!("Discarded cached configuration");
        }
        self.get()
    }

    fn load(&self) -> Result<Config> {
        let env = self.env.clone().unwrap_or_else(Environment::capture);
        let path = self.source.locate(&env)?;

        if !path.is_file() {
            return Err(Error::not_found(format!(
                "{} does not exist or is not a file",
                path.display()
            )));
        }

        let config = Config::load(&path, &Expander::with_env(env))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }
}
