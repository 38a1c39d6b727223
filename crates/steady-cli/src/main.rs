//! Steady CLI - Financial crisis prevention for gig workers
//!
//! Usage:
//!   steady serve --port 8000       Start the web server
//!   steady forecast --file CSV     Project three income futures
//!   steady check --file CSV        Run the full agent pipeline once
//!   steady chat --file CSV "..."   Ask the coaching assistant a question

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Serve {
            port,
            host,
            static_dir,
        } => commands::cmd_serve(&host, port, static_dir.as_deref()).await,
        Commands::Forecast { file, periods } => commands::cmd_forecast(&file, periods),
        Commands::Check {
            file,
            balance,
            expenses,
        } => commands::cmd_check(&file, balance, expenses),
        Commands::Chat {
            file,
            message,
            balance,
            expenses,
        } => commands::cmd_chat(&file, &message, balance, expenses).await,
    }
}
