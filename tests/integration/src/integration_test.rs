//! End-to-end resolution: documents on disk -> preload expansion ->
//! context -> command-line overrides -> value lookup.

use clap::{Arg, ArgAction, Command};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;
use strata_cli::OverrideAdapter;
use strata_core::{ConfigContext, ConfigSource, DEFAULT_ENV_VAR, Environment, Error};
use strata_test_utils::ConfigDir;

/// Path to the test-fixtures directory (relative to the workspace root).
fn fixtures_dir() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    // tests/integration -> ../../test-fixtures
    manifest_dir.join("../../test-fixtures")
}

fn layered_context(site: &str) -> ConfigContext {
    let main = fixtures_dir().join("layered/main.yaml");
    ConfigContext::with_env(
        ConfigSource::explicit(main),
        Environment::from_vars([("STRATA_SITE", site)]),
    )
}

fn load_expected(name: &str) -> Value {
    let path = fixtures_dir().join("expected").join(name);
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read expected output at {}: {}", path.display(), e));
    serde_json::from_str(&content).unwrap()
}

// ==========================================================================
// Layered fixture
// ==========================================================================

#[test]
fn test_layered_fixture_matches_golden_tree() {
    let mut ctx = layered_context("nersc");
    let config = ctx.get().unwrap();

    assert_eq!(config.tree(), &load_expected("nersc.json"));
}

#[test]
fn test_layered_fixture_site_selection() {
    let mut ctx = layered_context("local");
    let config = ctx.get().unwrap();

    assert_eq!(config.value("scheduler.name").unwrap(), "local");
    assert_eq!(config.value("db.postgres_host").unwrap(), "localhost");
    assert_eq!(config.value("scheduler.partitions").unwrap(), &json!([]));
}

#[test]
fn test_layered_fixture_unknown_site() {
    let mut ctx = layered_context("nowhere");

    let err = ctx.get().unwrap_err();
    assert!(matches!(
        err,
        Error::Tree(strata_tree::Error::NotFound { .. })
    ));
}

// ==========================================================================
// Full flow with overrides
// ==========================================================================

#[test]
fn test_context_then_overrides_then_lookup() {
    let dir = ConfigDir::new();
    let main = dir.write_preload_scenario();
    let env = Environment::from_vars([(DEFAULT_ENV_VAR, main.to_string_lossy().into_owned())]);
    let mut ctx = ConfigContext::with_env(ConfigSource::from_env(), env);

    let config = ctx.get_mut().unwrap();
    let mut adapter = OverrideAdapter::from_tree(config.tree());
    let command = adapter.augment(
        Command::new("app").arg(Arg::new("dry-run").long("dry-run").action(ArgAction::SetTrue)),
    );
    let matches = command
        .try_get_matches_from([
            "app",
            "--dry-run",
            "--option1",
            "hello",
            "--three_numbers",
            "4",
            "5",
            "6",
            "7",
            "8",
        ])
        .unwrap();

    assert!(matches.get_flag("dry-run"));
    assert_eq!(adapter.apply(config.tree_mut(), &matches).unwrap(), 2);

    let config = ctx.get().unwrap();
    assert_eq!(config.value("option1").unwrap(), "hello");
    assert_eq!(config.value("three_numbers").unwrap(), &json!([4, 5, 6, 7, 8]));
    assert_eq!(config.value("three_numbers.4").unwrap(), 8);
    assert_eq!(config.value("db.postgres_host").unwrap(), "postgres");
    assert_eq!(config.value("db.postgres_password").unwrap(), "X");

    assert!(matches!(
        config.value("nonexistent.key").unwrap_err(),
        Error::Tree(strata_tree::Error::PathNotFound { .. })
    ));
}

#[test]
fn test_overrides_do_not_survive_reload() {
    let dir = ConfigDir::new();
    let main = dir.write_preload_scenario();
    let mut ctx = ConfigContext::with_env(ConfigSource::explicit(&main), Environment::default());

    let config = ctx.get_mut().unwrap();
    let mut adapter = OverrideAdapter::from_tree(config.tree());
    adapter
        .apply_args(config.tree_mut(), "overrides", ["--many_options.sub1", "changed"])
        .unwrap();
    assert_eq!(ctx.get().unwrap().value("many_options.sub1").unwrap(), "changed");

    let reloaded = ctx.reload().unwrap();
    assert_eq!(reloaded.value("many_options.sub1").unwrap(), "subtest1");
}

#[test]
fn test_cycle_through_context() {
    let dir = ConfigDir::new();
    let a = dir.write("a.yaml", "preloads: [nested/b.yaml]\n");
    dir.write("nested/b.yaml", "preloads: [../a.yaml]\n");
    let mut ctx = ConfigContext::with_env(ConfigSource::explicit(&a), Environment::default());

    let err = ctx.get().unwrap_err();
    assert!(matches!(err, Error::CyclicPreload { ref chain } if chain.len() == 3));
    assert!(!ctx.is_loaded());
}
