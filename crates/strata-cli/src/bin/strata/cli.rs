//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Strata - inspect layered configuration documents
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Main configuration document
    #[arg(short, long, global = true, env = "STRATA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the resolved configuration
    ///
    /// Examples:
    ///   strata show
    ///   strata show --format json -- --db.postgres_host localhost
    Show {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,

        /// Overrides for configuration leaves, e.g. `-- --option1 hello`
        #[arg(last = true)]
        overrides: Vec<String>,
    },

    /// Print the value at a dotted address
    Get {
        /// Dotted address, e.g. `db.postgres_host` or `three_numbers.1`
        address: String,

        /// Overrides for configuration leaves
        #[arg(last = true)]
        overrides: Vec<String>,
    },

    /// List the override flags the configuration supports
    Flags,
}

/// Output format for `show`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
}
