//! Preload chain expansion
//!
//! A document may name other documents under reserved top-level keys:
//!
//! | Key | Applied | Mode |
//! |---|---|---|
//! | `preloads` | before the document's own content | [`MergeMode::Override`] |
//! | `replaceable_preloads` | before the document's own content | [`MergeMode::DestructiveAppend`] |
//! | `augments` | after | [`MergeMode::Augment`] |
//! | `overrides` | after | [`MergeMode::DestructiveAppend`] |
//! | `destructive_appends` | after | [`MergeMode::DestructiveAppend`] |
//!
//! Each referenced document is expanded (depth first) before it is merged,
//! lists are applied in declared order, and the reserved keys are removed
//! from the result.
//!
//! The declaring document's own content is first appended into its
//! replaceable preloads, so their sequences grow instead of being replaced,
//! and the result is merged over its ordinary preloads. Either way the
//! document's own scalars win over everything it preloads.
//!
//! Locators may contain `${NAME}` placeholders and are resolved relative to
//! the directory of the document that declares them.

use crate::env::Environment;
use crate::error::{Error, Result};
use crate::merge::{MergeMode, merge_in_place};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const PRELOADS_KEY: &str = "preloads";
pub const REPLACEABLE_PRELOADS_KEY: &str = "replaceable_preloads";
pub const AUGMENTS_KEY: &str = "augments";
pub const OVERRIDES_KEY: &str = "overrides";
pub const DESTRUCTIVE_APPENDS_KEY: &str = "destructive_appends";

/// Directives applied after the declaring document's own content, in order.
const POST_DIRECTIVES: [(&str, MergeMode); 3] = [
    (AUGMENTS_KEY, MergeMode::Augment),
    (OVERRIDES_KEY, MergeMode::DestructiveAppend),
    (DESTRUCTIVE_APPENDS_KEY, MergeMode::DestructiveAppend),
];

/// Expands directive keys into a single merged tree
#[derive(Debug, Clone, Default)]
pub struct Expander {
    env: Environment,
}

impl Expander {
    /// Create an expander that substitutes from the current process
    /// environment.
    pub fn new() -> Self {
        Self::with_env(Environment::capture())
    }

    /// Create an expander that substitutes from `env`.
    pub fn with_env(env: Environment) -> Self {
        Self { env }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Load the document at `path` and expand it.
    pub fn load(&self, path: &Path) -> Result<Value> {
        let raw = strata_tree::load(path)?;
        self.expand(raw, path)
    }

    /// Expand the directives of `raw`, a document read from `origin`.
    ///
    /// `origin` anchors relative locators and seeds cycle detection; it
    /// need not exist for documents built in memory.
    ///
    /// # Errors
    ///
    /// - [`Error::UnresolvedEnvReference`] for a placeholder naming an unset
    ///   variable
    /// - [`Error::CyclicPreload`] when a locator is already being expanded
    /// - [`Error::InvalidDirective`] when a directive isn't a list of strings
    /// - [`Error::MergeConflict`] from an `augments` document
    /// - [`Error::Tree`] when a referenced document can't be loaded
    pub fn expand(&self, raw: Value, origin: &Path) -> Result<Value> {
        let mut stack = vec![canonical(origin)];
        self.expand_document(raw, origin, &mut stack)
    }

    fn expand_document(
        &self,
        mut raw: Value,
        origin: &Path,
        stack: &mut Vec<PathBuf>,
    ) -> Result<Value> {
        let Value::Object(map) = &mut raw else {
            return Ok(raw);
        };

        let preloads = take_directive(map, PRELOADS_KEY)?;
        let replaceable = take_directive(map, REPLACEABLE_PRELOADS_KEY)?;
        let mut post = Vec::with_capacity(POST_DIRECTIVES.len());
        for (key, mode) in POST_DIRECTIVES {
            post.push((mode, take_directive(map, key)?));
        }

        let base_dir = origin.parent().unwrap_or_else(|| Path::new(""));
        let mut merged = Value::Object(Map::new());

        for locator in &preloads {
            debug!(%locator, origin = %origin.display(), "Applying preload");
            let document = self.expand_locator(locator, base_dir, stack)?;
            merge_in_place(&mut merged, &document, MergeMode::Override)?;
        }

        let own = if replaceable.is_empty() {
            raw
        } else {
            let mut chain = Value::Object(Map::new());
            for locator in &replaceable {
                debug!(%locator, origin = %origin.display(), "Applying replaceable preload");
                let document = self.expand_locator(locator, base_dir, stack)?;
                merge_in_place(&mut chain, &document, MergeMode::DestructiveAppend)?;
            }
            merge_in_place(&mut chain, &raw, MergeMode::DestructiveAppend)?;
            chain
        };
        merge_in_place(&mut merged, &own, MergeMode::Override)?;

        for (mode, locators) in &post {
            for locator in locators {
                debug!(%locator, ?mode, origin = %origin.display(), "Applying post-load document");
                let document = self.expand_locator(locator, base_dir, stack)?;
                merge_in_place(&mut merged, &document, *mode)?;
            }
        }

        Ok(merged)
    }

    fn expand_locator(
        &self,
        locator: &str,
        base_dir: &Path,
        stack: &mut Vec<PathBuf>,
    ) -> Result<Value> {
        let substituted = self.env.substitute(locator)?;
        let path = base_dir.join(substituted);
        let key = canonical(&path);

        if stack.contains(&key) {
            let mut chain = stack.clone();
            chain.push(key);
            return Err(Error::CyclicPreload { chain });
        }

        let raw = strata_tree::load(&path)?;
        stack.push(key);
        let expanded = self.expand_document(raw, &path, stack);
        stack.pop();
        expanded
    }
}

/// Identity of a document on the expansion stack.
fn canonical(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Remove `key` from `map` and read it as a list of locators.
fn take_directive(map: &mut Map<String, Value>, key: &str) -> Result<Vec<String>> {
    let invalid = |reason: String| Error::InvalidDirective {
        key: key.to_string(),
        reason,
    };

    match map.shift_remove(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(locator) => Ok(locator),
                other => Err(invalid(format!(
                    "entry {i} is not a string locator (found {})",
                    strata_tree::ValueKind::of(&other)
                ))),
            })
            .collect(),
        Some(other) => Err(invalid(format!(
            "expected a list of locators, found a {}",
            strata_tree::ValueKind::of(&other)
        ))),
    }
}
