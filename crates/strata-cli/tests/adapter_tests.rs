//! Deriving, registering and applying override flags

use clap::{Arg, ArgAction, Command};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use strata_cli::{Error, OverrideAdapter};

#[fixture]
fn scenario() -> Value {
    json!({
        "option1": "test1",
        "many_options": {"sub1": "subtest1", "sub2": "subtest2"},
        "three_numbers": [1, 2, 3],
        "ratio": 0.5,
        "debug": false,
        "retries": 3,
        "unset": null
    })
}

fn parse_and_apply(tree: &mut Value, args: &[&str]) -> strata_cli::Result<usize> {
    let mut adapter = OverrideAdapter::from_tree(tree);
    let command = adapter.augment(Command::new("app"));
    let matches = command.try_get_matches_from(std::iter::once("app").chain(args.iter().copied()))?;
    adapter.apply(tree, &matches)
}

#[rstest]
fn test_scalar_and_sequence_overrides(mut scenario: Value) {
    let applied = parse_and_apply(
        &mut scenario,
        &["--option1", "hello", "--three_numbers", "4", "5", "6", "7", "8"],
    )
    .unwrap();

    assert_eq!(applied, 2);
    assert_eq!(scenario["option1"], json!("hello"));
    assert_eq!(scenario["three_numbers"], json!([4, 5, 6, 7, 8]));
    assert_eq!(scenario["many_options"]["sub1"], json!("subtest1"));
}

#[rstest]
fn test_unsupplied_flags_leave_tree_untouched(mut scenario: Value) {
    let before = scenario.clone();
    let applied = parse_and_apply(&mut scenario, &[]).unwrap();

    assert_eq!(applied, 0);
    assert_eq!(scenario, before);
}

#[rstest]
#[case(&["--ratio", "2"], "ratio", json!(2.0))]
#[case(&["--ratio", "-1.25"], "ratio", json!(-1.25))]
#[case(&["--debug", "yes"], "debug", json!(true))]
#[case(&["--debug", "0"], "debug", json!(false))]
#[case(&["--retries", "-1"], "retries", json!(-1))]
#[case(&["--unset", "now set"], "unset", json!("now set"))]
#[case(&["--many_options.sub2", "nested"], "many_options", json!({"sub1": "subtest1", "sub2": "nested"}))]
fn test_values_keep_their_kind(
    mut scenario: Value,
    #[case] args: &[&str],
    #[case] key: &str,
    #[case] expected: Value,
) {
    parse_and_apply(&mut scenario, args).unwrap();
    assert_eq!(scenario[key], expected);
}

#[rstest]
#[case(&["--retries", "many"], "retries", "integer")]
#[case(&["--ratio", "half"], "ratio", "float")]
#[case(&["--debug", "maybe"], "debug", "boolean")]
#[case(&["--three_numbers", "4", "five"], "three_numbers", "integer")]
fn test_uncoercible_values_fail(
    mut scenario: Value,
    #[case] args: &[&str],
    #[case] address: &str,
    #[case] expected: &str,
) {
    let err = parse_and_apply(&mut scenario, args).unwrap_err();

    match err {
        Error::TypeCoercion {
            address: got_address,
            expected: got_expected,
            ..
        } => {
            assert_eq!(got_address, address);
            assert_eq!(got_expected, expected);
        }
        other => panic!("expected TypeCoercion, got {other:?}"),
    }
}

#[rstest]
fn test_failed_apply_leaves_tree_unchanged(mut scenario: Value) {
    let before = scenario.clone();

    let err = parse_and_apply(&mut scenario, &["--option1", "hello", "--retries", "many"])
        .unwrap_err();

    assert!(matches!(err, Error::TypeCoercion { .. }));
    assert_eq!(scenario, before);
}

#[rstest]
fn test_colliding_flags_are_skipped(mut scenario: Value) {
    let mut adapter = OverrideAdapter::from_tree(&scenario);
    let command = adapter.augment(
        Command::new("app").arg(Arg::new("debug").long("debug").action(ArgAction::SetTrue)),
    );

    assert_eq!(adapter.specs().len(), 8);
    assert_eq!(adapter.registered().count(), 7);
    assert!(adapter.registered().all(|spec| spec.flag_name != "debug"));

    let matches = command
        .try_get_matches_from(["app", "--debug", "--retries", "9"])
        .unwrap();
    assert_eq!(adapter.apply(&mut scenario, &matches).unwrap(), 1);
    assert_eq!(scenario["debug"], json!(false));
    assert_eq!(scenario["retries"], json!(9));
}

#[test]
fn test_custom_separator() {
    let mut tree = json!({"db": {"postgres": {"port": 5432}}});
    let mut adapter = OverrideAdapter::with_separator(&tree, "-");
    let command = adapter.augment(Command::new("app"));

    let matches = command
        .try_get_matches_from(["app", "--db-postgres-port", "6543"])
        .unwrap();
    adapter.apply(&mut tree, &matches).unwrap();

    assert_eq!(tree, json!({"db": {"postgres": {"port": 6543}}}));
}

#[test]
fn test_apply_args_reports_unknown_flags() {
    let mut tree = json!({"known": 1});
    let mut adapter = OverrideAdapter::from_tree(&tree);

    let err = adapter
        .apply_args(&mut tree, "overrides", ["--unknown", "1"])
        .unwrap_err();
    assert!(matches!(err, Error::Clap(_)));

    let applied = adapter
        .apply_args(&mut tree, "overrides", ["--known", "2"])
        .unwrap();
    assert_eq!(applied, 1);
    assert_eq!(tree, json!({"known": 2}));
}

#[test]
fn test_help_lists_override_flags() {
    let tree = json!({"option1": "test1", "three_numbers": [1, 2, 3]});
    let mut adapter = OverrideAdapter::from_tree(&tree);
    let help = adapter
        .augment(Command::new("app"))
        .render_long_help()
        .to_string();

    assert!(help.contains("--option1 <TEXT>"));
    assert!(help.contains("--three_numbers <INT>..."));
    assert!(help.contains("Override `three_numbers` (default: [1,2,3])"));
}
