//! Run command implementation

use crate::bot::ArbitrageBot;
use crate::config::{Config, ConfigError, ExecutionMode};
use crate::execution::{
    ClobSubmitter, DryRunSigner, ExecutionCoordinator, OrderSigner, OrderSubmitter,
    PaperSubmitter, RemoteSigner, DRY_RUN_ADDRESS,
};
use crate::feed::MarketFeed;
use crate::market::{ClobCatalog, ClobCatalogConfig};
use crate::ws::WsConfig;
use clap::Args;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Force paper execution regardless of the configured mode
    #[arg(long)]
    pub dry_run: bool,

    /// Override the sizing bankroll
    #[arg(long)]
    pub bankroll: Option<Decimal>,
}

impl RunArgs {
    pub async fn execute(&self, mut config: Config) -> anyhow::Result<()> {
        if self.dry_run {
            config.execution.mode = ExecutionMode::Paper;
        }
        if let Some(bankroll) = self.bankroll {
            config.sizing.bankroll = bankroll;
        }
        config.validate()?;

        let catalog = ClobCatalog::with_config(ClobCatalogConfig {
            base_url: config.market.api_url.clone(),
            timeout: Duration::from_secs(config.execution.request_timeout_secs),
        })?;
        let feed = MarketFeed::new(WsConfig::from_feed(&config.feed));
        let coordinator = build_coordinator(&config)?;

        tracing::info!(
            mode = ?config.execution.mode,
            account = %coordinator.address(),
            min_edge = %config.detector.min_edge_threshold,
            bankroll = %config.sizing.bankroll,
            "Starting arbitrage bot"
        );

        let bot = Arc::new(ArbitrageBot::new(
            &config,
            Arc::new(catalog),
            Arc::new(feed),
            coordinator,
        ));
        bot.run().await
    }
}

/// Wire the signer and submitter for the configured execution mode
pub fn build_coordinator(config: &Config) -> anyhow::Result<ExecutionCoordinator> {
    let execution = &config.execution;
    let timeout = Duration::from_secs(execution.request_timeout_secs);

    let (signer, submitter): (Arc<dyn OrderSigner>, Arc<dyn OrderSubmitter>) =
        match execution.mode {
            ExecutionMode::Paper => {
                let address = execution
                    .account_address
                    .clone()
                    .unwrap_or_else(|| DRY_RUN_ADDRESS.to_string());
                (
                    Arc::new(DryRunSigner::new(address)),
                    Arc::new(PaperSubmitter::new()),
                )
            }
            ExecutionMode::Live => {
                let address = execution
                    .account_address
                    .clone()
                    .ok_or(ConfigError::MissingAccount)?;
                let signer_url = execution
                    .signer_url
                    .clone()
                    .ok_or(ConfigError::MissingSigner)?;
                (
                    Arc::new(RemoteSigner::new(signer_url, address, timeout)?),
                    Arc::new(ClobSubmitter::new(execution.api_url.clone(), timeout)?),
                )
            }
        };

    Ok(ExecutionCoordinator::new(
        signer,
        submitter,
        chrono::Duration::seconds(execution.order_expiry_secs),
    ))
}
