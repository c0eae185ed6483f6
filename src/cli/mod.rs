//! CLI interface for poly-arb
//!
//! Provides subcommands for:
//! - `run`: Start the arbitrage bot
//! - `scan`: One-shot scan of the market catalog
//! - `config`: Show the effective configuration

mod run;
mod scan;

pub use run::{build_coordinator, RunArgs};
pub use scan::ScanArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "poly-arb")]
#[command(about = "Complete-set arbitrage bot for Polymarket binary markets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the arbitrage bot
    Run(RunArgs),
    /// Fetch the catalog once and rank the opportunities it prices
    Scan(ScanArgs),
    /// Show the effective configuration
    Config,
}
