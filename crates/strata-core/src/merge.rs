//! Merging configuration trees
//!
//! Merging is leaf-level: when both sides hold a mapping at the same key the
//! merge descends, so children the overlay doesn't mention survive from the
//! base. What happens at a leaf depends on the [`MergeMode`].
//!
//! Merging is **not** associative once kinds disagree across more than two
//! layers (`{a: {b: 1}}`, `{a: 2}`, `{a: {c: 3}}` gives `{a: {c: 3}}` folded
//! left but `{a: {b: 1, c: 3}}` folded right). Always fold left to right in
//! declaration order, as [`merge_all`] does.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use strata_tree::ValueKind;

/// How an overlay is applied to a base
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeMode {
    /// Mappings merge per key; scalars and sequences from the overlay
    /// replace the base. A kind disagreement is settled by the overlay.
    #[default]
    Override,
    /// Mappings merge per key and sequences are concatenated. The overlay
    /// may only add: changing an existing non-null value is a conflict.
    Augment,
    /// Mappings merge per key, sequences are concatenated, anything else
    /// from the overlay replaces the base.
    DestructiveAppend,
}

/// Merge `overlay` over `base`, returning a new tree.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata_core::merge::merge;
///
/// let base = json!({"db": {"host": "postgres", "port": 5432}, "tags": ["a", "b"]});
/// let overlay = json!({"db": {"port": 6543}, "tags": ["c"]});
///
/// assert_eq!(
///     merge(&base, &overlay),
///     json!({"db": {"host": "postgres", "port": 6543}, "tags": ["c"]})
/// );
/// ```
pub fn merge(base: &Value, overlay: &Value) -> Value {
    let mut merged = base.clone();
    override_into(&mut merged, overlay);
    merged
}

/// Fold `layers` left to right with [`MergeMode::Override`], starting from
/// an empty mapping.
pub fn merge_all<'a>(layers: impl IntoIterator<Item = &'a Value>) -> Value {
    let mut merged = Value::Object(Map::new());
    for layer in layers {
        override_into(&mut merged, layer);
    }
    merged
}

/// Merge `overlay` into `base` in place using `mode`.
///
/// # Errors
///
/// Only [`MergeMode::Augment`] can fail, with [`Error::MergeConflict`].
pub fn merge_in_place(base: &mut Value, overlay: &Value, mode: MergeMode) -> Result<()> {
    match mode {
        MergeMode::Override => {
            override_into(base, overlay);
            Ok(())
        }
        _ => append_into(base, overlay, mode, &mut Vec::new()),
    }
}

fn override_into(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                if let Some(base_val) = base_map.get_mut(key) {
                    override_into(base_val, overlay_val);
                } else {
                    base_map.insert(key.clone(), overlay_val.clone());
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}

fn append_into(
    base: &mut Value,
    overlay: &Value,
    mode: MergeMode,
    path: &mut Vec<String>,
) -> Result<()> {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                if let Some(base_val) = base_map.get_mut(key) {
                    path.push(key.clone());
                    append_into(base_val, overlay_val, mode, path)?;
                    path.pop();
                } else {
                    base_map.insert(key.clone(), overlay_val.clone());
                }
            }
            Ok(())
        }
        (Value::Array(base_items), Value::Array(overlay_items)) => {
            base_items.extend(overlay_items.iter().cloned());
            Ok(())
        }
        (base, overlay) if mode == MergeMode::Augment && !base.is_null() && *base != *overlay => {
            Err(Error::conflict(
                path.join("."),
                format!(
                    "already set to a {}, an augmenting document may not replace it with a {}",
                    ValueKind::of(base),
                    ValueKind::of(overlay)
                ),
            ))
        }
        (base, overlay) => {
            *base = overlay.clone();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deep_merge_objects() {
        let base = json!({
            "a": 1,
            "b": { "x": 10, "y": 20 }
        });
        let overlay = json!({
            "b": { "y": 25, "z": 30 },
            "c": 3
        });

        let merged = merge(&base, &overlay);

        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"]["x"], 10);
        assert_eq!(merged["b"]["y"], 25);
        assert_eq!(merged["b"]["z"], 30);
        assert_eq!(merged["c"], 3);
    }

    #[test]
    fn test_sequences_are_atomic() {
        let merged = merge(&json!({"list": [1, 2, 3]}), &json!({"list": [9]}));
        assert_eq!(merged, json!({"list": [9]}));
    }

    #[test]
    fn test_kind_disagreement_overlay_wins() {
        let merged = merge(&json!({"a": {"b": 1}}), &json!({"a": "flat"}));
        assert_eq!(merged, json!({"a": "flat"}));

        let merged = merge(&json!({"a": "flat"}), &json!({"a": {"b": 1}}));
        assert_eq!(merged, json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_merge_is_not_associative() {
        let a = json!({"a": {"b": 1}});
        let b = json!({"a": 2});
        let c = json!({"a": {"c": 3}});

        assert_eq!(merge(&merge(&a, &b), &c), json!({"a": {"c": 3}}));
        assert_eq!(merge(&a, &merge(&b, &c)), json!({"a": {"b": 1, "c": 3}}));
        assert_eq!(merge_all([&a, &b, &c]), json!({"a": {"c": 3}}));
    }

    #[test]
    fn test_merge_preserves_base_order() {
        let merged = merge(&json!({"z": 1, "a": 2}), &json!({"m": 3, "z": 4}));
        let keys: Vec<&String> = merged.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_destructive_append() {
        let mut base = json!({"list": ["main1", "main2"], "scalar": "hello", "d": {"v1": 1, "v2": 2}});
        let overlay = json!({"list": ["app1"], "scalar": "world", "d": {"v2": 22, "v3": 3}});
        merge_in_place(&mut base, &overlay, MergeMode::DestructiveAppend).unwrap();

        assert_eq!(
            base,
            json!({"list": ["main1", "main2", "app1"], "scalar": "world", "d": {"v1": 1, "v2": 22, "v3": 3}})
        );
    }

    #[test]
    fn test_augment_adds_and_extends() {
        let mut base = json!({"d": {"a": 1}, "list": [1], "unset": null});
        let overlay = json!({"d": {"b": 2}, "list": [2], "unset": "now", "new": true});
        merge_in_place(&mut base, &overlay, MergeMode::Augment).unwrap();

        assert_eq!(
            base,
            json!({"d": {"a": 1, "b": 2}, "list": [1, 2], "unset": "now", "new": true})
        );
    }

    #[test]
    fn test_augment_rejects_changed_scalar() {
        let mut base = json!({"d": {"a": 1}});
        let err = merge_in_place(&mut base, &json!({"d": {"a": 2}}), MergeMode::Augment)
            .unwrap_err();

        match err {
            Error::MergeConflict { address, .. } => assert_eq!(address, "d.a"),
            other => panic!("expected MergeConflict, got {other:?}"),
        }
    }

    #[test]
    fn test_augment_allows_identical_scalar() {
        let mut base = json!({"a": "same"});
        merge_in_place(&mut base, &json!({"a": "same"}), MergeMode::Augment).unwrap();
        assert_eq!(base, json!({"a": "same"}));
    }
}
