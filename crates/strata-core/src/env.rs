//! Environment snapshots and `${NAME}` substitution in locators

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// A snapshot of environment variables.
///
/// Captured once so that a whole expansion sees one consistent view, and so
/// tests can supply their own variables without touching the process
/// environment.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Snapshot the process environment. Variables that aren't valid
    /// Unicode are skipped.
    pub fn capture() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Build an environment from explicit pairs.
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Replace every `${NAME}` in `locator` with the variable's value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedEnvReference`] for the first placeholder
    /// whose variable is unset.
    pub fn substitute(&self, locator: &str) -> Result<String> {
        let mut out = String::with_capacity(locator.len());
        let mut last = 0;

        for caps in PLACEHOLDER_PATTERN.captures_iter(locator) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = self
                .get(name.as_str())
                .ok_or_else(|| Error::UnresolvedEnvReference {
                    name: name.as_str().to_string(),
                    locator: locator.to_string(),
                })?;
            out.push_str(&locator[last..whole.start()]);
            out.push_str(value);
            last = whole.end();
        }
        out.push_str(&locator[last..]);

        Ok(out)
    }
}
