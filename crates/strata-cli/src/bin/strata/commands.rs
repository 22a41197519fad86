//! Command implementations

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use serde_json::Value;
use strata_cli::OverrideAdapter;
use strata_core::{Config, ConfigContext};
use tracing::debug;

/// Print the resolved tree.
pub fn run_show(ctx: &mut ConfigContext, format: OutputFormat, overrides: &[String]) -> Result<()> {
    let config = resolve(ctx, overrides)?;
    let rendered = match format {
        OutputFormat::Yaml => config.to_yaml()?,
        OutputFormat::Json => strata_tree::to_json_string_pretty(config.tree())? + "\n",
    };
    print!("{rendered}");
    Ok(())
}

/// Print one value. Strings are printed bare, blocks as YAML.
pub fn run_get(ctx: &mut ConfigContext, address: &str, overrides: &[String]) -> Result<()> {
    let config = resolve(ctx, overrides)?;
    match config.value(address)? {
        Value::String(s) => println!("{s}"),
        block @ (Value::Array(_) | Value::Object(_)) => {
            print!("{}", strata_tree::to_yaml_string(block)?)
        }
        scalar => println!("{scalar}"),
    }
    Ok(())
}

/// List the override flags, their kinds and current values.
pub fn run_flags(ctx: &mut ConfigContext) -> Result<()> {
    let config = ctx.get()?;
    let adapter = OverrideAdapter::from_tree(config.tree());

    if adapter.specs().is_empty() {
        println!("{}", "No overridable values".yellow());
        return Ok(());
    }

    let width = adapter
        .specs()
        .iter()
        .map(|spec| spec.flag_name.len())
        .max()
        .unwrap_or(0);

    for spec in adapter.specs() {
        let flag = format!("--{:<width$}", spec.flag_name);
        println!(
            "{}  {:<20}  {}",
            flag.cyan(),
            spec.kind.to_string(),
            spec.default.to_string().dimmed()
        );
    }
    Ok(())
}

/// Load the configuration and apply command-line overrides to it.
///
/// Override arguments that don't parse end the process with clap's usual
/// message and exit code.
fn resolve<'a>(ctx: &'a mut ConfigContext, overrides: &[String]) -> Result<&'a Config> {
    let config = ctx.get_mut()?;

    if !overrides.is_empty() {
        let mut adapter = OverrideAdapter::from_tree(config.tree());
        let applied = match adapter.apply_args(config.tree_mut(), "strata", overrides) {
            Err(strata_cli::Error::Clap(e)) => e.exit(),
            result => result?,
        };
        debug!(applied, "Applied command-line overrides");
    }

    Ok(config)
}
