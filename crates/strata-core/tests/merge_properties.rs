//! Algebraic properties of the override merge

use proptest::prelude::*;
use serde_json::{Map, Value};
use strata_core::{merge, merge_all};
use strata_tree::{Address, PathSegment, leaves, resolve};

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-100i64..100).prop_map(Value::from),
        "[a-z]{1,4}".prop_map(Value::String),
    ]
}

/// Trees over a small key alphabet so that overlays often collide with
/// the base.
fn tree() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        3 => scalar(),
        1 => prop::collection::vec(scalar(), 0..3).prop_map(Value::Array),
    ];
    let node = leaf.prop_recursive(3, 16, 3, |inner| {
        prop::collection::vec(("[a-c]", inner), 0..3)
            .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>()))
    });
    prop::collection::vec(("[a-c]", node), 0..4)
        .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>()))
}

/// True when every node `overlay` holds along `address` is a mapping, so
/// the overlay never cuts the base's path short.
fn overlay_is_silent_on(overlay: &Value, address: &Address) -> bool {
    let mut node = overlay;
    for segment in address.segments() {
        let PathSegment::Key(key) = segment else {
            return false;
        };
        match node {
            Value::Object(map) => match map.get(key) {
                Some(child) => node = child,
                None => return true,
            },
            _ => return false,
        }
    }
    false
}

proptest! {
    #[test]
    fn test_overlay_wins_where_defined(base in tree(), overlay in tree()) {
        let merged = merge(&base, &overlay);
        for (address, value) in leaves(&overlay) {
            prop_assert_eq!(resolve(&merged, &address).unwrap(), value);
        }
    }

    #[test]
    fn test_base_survives_where_overlay_is_silent(base in tree(), overlay in tree()) {
        let merged = merge(&base, &overlay);
        for (address, value) in leaves(&base) {
            if overlay_is_silent_on(&overlay, &address) {
                prop_assert_eq!(resolve(&merged, &address).unwrap(), value);
            }
        }
    }

    #[test]
    fn test_merge_with_empty_is_identity(t in tree()) {
        let empty = Value::Object(Map::new());
        prop_assert_eq!(&merge(&t, &empty), &t);
        prop_assert_eq!(&merge(&empty, &t), &t);
    }

    #[test]
    fn test_merge_all_folds_left(a in tree(), b in tree(), c in tree()) {
        prop_assert_eq!(merge_all([&a, &b, &c]), merge(&merge(&a, &b), &c));
    }
}
