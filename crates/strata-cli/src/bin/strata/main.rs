//! Strata CLI
//!
//! Resolves a layered configuration and prints it, optionally with
//! command-line overrides applied.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use strata_core::{ConfigContext, ConfigSource};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {e}")))?;
        tracing::debug!("Verbose mode enabled");
    }

    let mut ctx = ConfigContext::new(ConfigSource::explicit_or_env(cli.config));

    match cli.command {
        Commands::Show { format, overrides } => commands::run_show(&mut ctx, format, &overrides),
        Commands::Get { address, overrides } => commands::run_get(&mut ctx, &address, &overrides),
        Commands::Flags => commands::run_flags(&mut ctx),
    }
}
