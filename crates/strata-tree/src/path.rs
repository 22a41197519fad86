//! Dotted addressing into configuration trees
//!
//! This module provides utilities for navigating and modifying configuration
//! trees using dot-separated addresses.
//!
//! # Address Syntax
//!
//! - Dot-separated keys: `db.postgres_host`
//! - Numeric segments: `three_numbers.1`. A numeric segment indexes a
//!   sequence when the current node is a sequence and is a literal mapping
//!   key otherwise.
//! - Bracket indexing: `servers[0].host`. A bracketed index only ever
//!   matches a sequence.
//!
//! # Examples
//!
//! ```
//! use strata_tree::path::{resolve, Address};
//! use serde_json::json;
//!
//! let tree = json!({"three_numbers": [1, 2, 3], "many_options": {"sub1": "subtest1"}});
//! assert_eq!(resolve(&tree, &Address::parse("three_numbers.1")).unwrap(), &json!(2));
//! assert_eq!(resolve(&tree, &Address::parse("many_options.sub1")).unwrap(), &json!("subtest1"));
//! ```

use crate::error::{Error, Result};
use crate::kind::ValueKind;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// A segment of an address - either a key or an explicit sequence index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A dotted segment. Used as a sequence index when it parses as one and
    /// the node being addressed is a sequence.
    Key(String),
    /// A bracketed index (e.g. 0 in `items[0]`)
    Index(usize),
}

impl PathSegment {
    /// The sequence index this segment denotes, if any.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Key(key) => key.parse().ok(),
            PathSegment::Index(idx) => Some(*idx),
        }
    }
}

/// An ordered list of path segments naming a node in a tree.
///
/// The empty address names the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Address {
    segments: Vec<PathSegment>,
}

impl Address {
    /// The address of the root node.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a dotted address string.
    ///
    /// Empty segments (`a..b`, leading or trailing dots) are ignored.
    ///
    /// ```
    /// use strata_tree::path::{Address, PathSegment};
    ///
    /// let address = Address::parse("nest.nest1[0].val");
    /// assert_eq!(address.segments(), &[
    ///     PathSegment::Key("nest".to_string()),
    ///     PathSegment::Key("nest1".to_string()),
    ///     PathSegment::Index(0),
    ///     PathSegment::Key("val".to_string()),
    /// ]);
    /// ```
    pub fn parse(address: &str) -> Self {
        let mut segments = Vec::new();
        let mut current_key = String::new();
        let mut chars = address.chars();

        while let Some(ch) = chars.next() {
            match ch {
                '.' => {
                    if !current_key.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut current_key)));
                    }
                }
                '[' => {
                    if !current_key.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut current_key)));
                    }
                    let mut index_str = String::new();
                    for ch in chars.by_ref() {
                        if ch == ']' {
                            break;
                        }
                        index_str.push(ch);
                    }
                    match index_str.trim().parse::<usize>() {
                        Ok(index) => segments.push(PathSegment::Index(index)),
                        // Kept as a key so lookups fail instead of addressing the parent.
                        Err(_) => segments.push(PathSegment::Key(format!("[{index_str}]"))),
                    }
                }
                _ => current_key.push(ch),
            }
        }

        if !current_key.is_empty() {
            segments.push(PathSegment::Key(current_key));
        }

        Self { segments }
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Return a new address with `key` appended.
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.into()));
        Self { segments }
    }

    /// Render the address with `separator` between every segment.
    ///
    /// Unlike [`Display`](fmt::Display), indices are rendered as plain
    /// numbers, which is what command-line flag names need.
    pub fn join(&self, separator: &str) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                PathSegment::Key(key) => key.clone(),
                PathSegment::Index(idx) => idx.to_string(),
            })
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            match segment {
                PathSegment::Key(key) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
            }
            first = false;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// How [`set_value`] treats integer segments that address a sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SetMode {
    /// Replace the element in bounds; an out-of-bounds index replaces the
    /// whole sequence with a one-element sequence.
    #[default]
    Replace,
    /// Append to the sequence regardless of the index given.
    AppendLists,
}

/// Take one step down the tree, or say why it can't be taken.
fn step<'a>(node: &'a Value, segment: &PathSegment) -> std::result::Result<&'a Value, String> {
    match (node, segment) {
        (Value::Object(map), PathSegment::Key(key)) => {
            map.get(key).ok_or_else(|| format!("no key `{key}`"))
        }
        (Value::Object(_), PathSegment::Index(idx)) => {
            Err(format!("index [{idx}] applied to a mapping"))
        }
        (Value::Array(items), segment) => {
            let Some(idx) = segment.as_index() else {
                let field = Address::from_segments(vec![segment.clone()]);
                return Err(format!("`{field}` is not an index into a sequence"));
            };
            items.get(idx).ok_or_else(|| {
                format!(
                    "index {idx} out of bounds for sequence of length {}",
                    items.len()
                )
            })
        }
        (scalar, _) => Err(format!(
            "cannot descend into a {} value",
            ValueKind::of(scalar)
        )),
    }
}

/// Get the node at `address`.
///
/// The node may be a leaf or an internal mapping; see [`resolve_higher`]
/// for the subtree-only form.
///
/// # Errors
///
/// Returns [`Error::PathNotFound`] if a key is absent, an index is out of
/// bounds, or a scalar would have to be descended into.
pub fn resolve<'a>(tree: &'a Value, address: &Address) -> Result<&'a Value> {
    let mut current = tree;
    for segment in address.segments() {
        current =
            step(current, segment).map_err(|reason| Error::path_not_found(address, reason))?;
    }
    Ok(current)
}

/// Get the mapping at `address`, for callers that want a whole block.
///
/// # Errors
///
/// Returns [`Error::PathNotFound`] if the address doesn't exist or names a
/// leaf rather than a mapping.
pub fn resolve_higher<'a>(tree: &'a Value, address: &Address) -> Result<&'a Map<String, Value>> {
    let node = resolve(tree, address)?;
    node.as_object().ok_or_else(|| {
        Error::path_not_found(
            address,
            format!("names a {} leaf, not a mapping", ValueKind::of(node)),
        )
    })
}

/// Write `new_value` at `address`, creating intermediate nodes as needed.
///
/// - Missing mapping keys are created.
/// - A scalar found where the address continues is replaced by a mapping
///   (key segment) or a sequence (integer segment).
/// - An integer segment that would add a new key to a mapping is rejected.
/// - Integer segments on sequences follow `mode`.
///
/// # Errors
///
/// Returns [`Error::InvalidSet`] for an integer field added to a mapping, a
/// non-integer field added to a sequence, or the root address.
pub fn set_value(
    tree: &mut Value,
    address: &Address,
    new_value: Value,
    mode: SetMode,
) -> Result<()> {
    if address.is_root() {
        return Err(Error::invalid_set(address, "the root cannot be replaced"));
    }
    set_in(tree, address.segments(), new_value, mode, address)
}

fn set_in(
    node: &mut Value,
    segments: &[PathSegment],
    new_value: Value,
    mode: SetMode,
    address: &Address,
) -> Result<()> {
    let Some((first, rest)) = segments.split_first() else {
        *node = new_value;
        return Ok(());
    };

    match node {
        Value::Object(map) => {
            let key = match first {
                PathSegment::Key(key) if map.contains_key(key) || key.parse::<usize>().is_err() => {
                    key
                }
                _ => {
                    return Err(Error::invalid_set(
                        address,
                        "tried to add an integer field to a mapping",
                    ));
                }
            };
            if rest.is_empty() {
                map.insert(key.clone(), new_value);
                return Ok(());
            }
            let child = map.entry(key.clone()).or_insert(Value::Null);
            set_in(child, rest, new_value, mode, address)
        }
        Value::Array(items) => {
            let Some(idx) = first.as_index() else {
                return Err(Error::invalid_set(
                    address,
                    "tried to add a non-integer field to a sequence",
                ));
            };
            match mode {
                SetMode::Replace if idx < items.len() => {
                    set_in(&mut items[idx], rest, new_value, mode, address)
                }
                SetMode::Replace => {
                    let mut child = Value::Null;
                    set_in(&mut child, rest, new_value, mode, address)?;
                    *items = vec![child];
                    Ok(())
                }
                SetMode::AppendLists => {
                    let mut child = Value::Null;
                    set_in(&mut child, rest, new_value, mode, address)?;
                    items.push(child);
                    Ok(())
                }
            }
        }
        _ => {
            *node = if first.as_index().is_some() {
                Value::Array(Vec::new())
            } else {
                Value::Object(Map::new())
            };
            set_in(node, segments, new_value, mode, address)
        }
    }
}

/// Collect every leaf (scalar or sequence) under `tree`, depth first, in
/// insertion order.
///
/// Sequences are leaves and are not descended into. Empty mappings
/// contribute nothing.
pub fn leaves(tree: &Value) -> Vec<(Address, &Value)> {
    let mut out = Vec::new();
    let mut prefix = Vec::new();
    collect_leaves(tree, &mut prefix, &mut out);
    out
}

fn collect_leaves<'a>(
    node: &'a Value,
    prefix: &mut Vec<PathSegment>,
    out: &mut Vec<(Address, &'a Value)>,
) {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                prefix.push(PathSegment::Key(key.clone()));
                collect_leaves(child, prefix, out);
                prefix.pop();
            }
        }
        _ if prefix.is_empty() => {}
        leaf => out.push((Address::from_segments(prefix.clone()), leaf)),
    }
}
