use anyhow::Context;
use clap::Parser;
use poly_arb::cli::{Cli, Commands};
use poly_arb::config::Config;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration, falling back to the bundled example when absent
    let config = if Path::new(&cli.config).exists() {
        Config::load(&cli.config).with_context(|| format!("loading {}", cli.config))?
    } else {
        eprintln!("Warning: {} not found, using default configuration", cli.config);
        toml::from_str(include_str!("../config.toml.example")).context("Invalid default config")?
    };

    // Initialize telemetry
    let _telemetry = poly_arb::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            args.execute(config).await?;
        }
        Commands::Scan(args) => {
            args.execute(config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Feed: {}", config.feed.ws_url);
            println!(
                "  Market: {} (limit {}, refresh {}s)",
                config.market.api_url, config.market.fetch_limit, config.market.refresh_interval_secs
            );
            println!(
                "  Detector: min edge {}",
                config.detector.min_edge_threshold
            );
            println!(
                "  Sizing: bankroll={}, Kelly={}, scale={}, max={}",
                config.sizing.bankroll,
                config.sizing.kelly_fraction,
                config.sizing.edge_scale,
                config.sizing.max_position_size
            );
            println!(
                "  Validator: max age {}ms, max drift {}, min profit ${}",
                config.validator.max_age_ms,
                config.validator.max_price_drift,
                config.validator.min_expected_profit
            );
            println!("  Execution: {:?}", config.execution.mode);
            println!(
                "  Bot: {} concurrent execution(s)",
                config.bot.max_concurrent_executions
            );
        }
    }

    Ok(())
}
