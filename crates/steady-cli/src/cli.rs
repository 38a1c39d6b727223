//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Steady - Crisis prevention for gig-worker finances
#[derive(Parser)]
#[command(name = "steady")]
#[command(about = "Financial-planning backend for gig workers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Project three income futures from an income CSV
    Forecast {
        /// CSV file with date,income columns
        #[arg(short, long)]
        file: PathBuf,

        /// Days to forecast
        #[arg(short, long, default_value = "90")]
        periods: usize,
    },

    /// Run the full agent pipeline against an income CSV
    Check {
        /// CSV file with date,income columns
        #[arg(short, long)]
        file: PathBuf,

        /// Current balance (defaults to a week of average income)
        #[arg(short, long)]
        balance: Option<f64>,

        /// Average daily expenses
        #[arg(short, long, default_value = "500")]
        expenses: f64,
    },

    /// Ask the coaching assistant one question about an income CSV
    Chat {
        /// CSV file with date,income columns
        #[arg(short, long)]
        file: PathBuf,

        /// The question to ask
        message: String,

        /// Current balance (defaults to a week of average income)
        #[arg(short, long)]
        balance: Option<f64>,

        /// Average daily expenses
        #[arg(short, long, default_value = "500")]
        expenses: f64,
    },
}
