//! CLI module graph and command dispatch.

pub mod adapters;
pub mod board;
pub mod check;
pub mod command;
pub mod output;
pub mod run;

use crate::error::Result;
use command::{CheckCommand, Cli, ColorChoice, Commands};

/// Apply the global output flags before any command prints.
pub fn configure(cli: &Cli) {
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => owo_colors::unset_override(),
    }
    output::configure(output::OutputConfig::new(cli.json, cli.quiet));
}

/// Run the selected subcommand.
///
/// # Errors
///
/// Returns the first error raised by the command handler.
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run::execute(&args).await,
        Commands::Adapters => adapters::execute(),
        Commands::Check(CheckCommand::Config(arg)) => check::execute_config(&arg.config),
    }
}
