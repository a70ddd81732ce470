use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use fundarb::adapter::inbound::cli::{self, command::Cli, output};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli::configure(&cli);

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("TLS crypto provider already installed");
    }

    cli::execute(cli).await.context("fundarb failed")
}
