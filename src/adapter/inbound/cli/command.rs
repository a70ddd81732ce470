//! Command-line interface definitions.
//!
//! Defines the CLI structure for the fundarb application using `clap`: a
//! foreground `run` that prints the ranked board, adapter listing, and
//! configuration checks.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::RankingPolicy;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG: &str = "config.toml";

/// Cross-exchange funding-rate arbitrage monitor
#[derive(Parser, Debug)]
#[command(name = "fundarb")]
#[command(version, about)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands for the fundarb CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream funding rates and print ranked opportunities (foreground)
    Run(RunArgs),

    /// List registered exchange adapters
    Adapters,

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `fundarb check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file syntax and semantics.
    Config(ConfigPathArg),
}

/// Shared argument struct for commands that require only a configuration path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

/// Arguments for the `run` subcommand.
///
/// Flags override the matching configuration values.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the configuration file (defaults apply when absent).
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Refresh interval for polling venues in seconds (0 = off).
    #[arg(long)]
    pub interval: Option<u64>,

    /// Ranking policy: all_profitable or best_per_symbol.
    #[arg(long)]
    pub ranking: Option<RankingPolicy>,

    /// Comma-separated adapters to enable (e.g., "lighter,edgex").
    #[arg(long, value_delimiter = ',')]
    pub enable: Option<Vec<String>>,

    /// Use JSON log format instead of pretty-printed logs.
    #[arg(long)]
    pub json_logs: bool,

    /// Maximum rows printed per board (0 = all).
    #[arg(long)]
    pub max_rows: Option<usize>,
}
