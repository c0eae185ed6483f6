//! Scan command implementation

use crate::config::Config;
use crate::market::{seed_prices, ClobCatalog, ClobCatalogConfig, MarketCatalog};
use crate::opportunity::{OpportunityDetector, OpportunityValidator};
use crate::price::PriceCache;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Markets to fetch (defaults to market.fetch_limit)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Print the ranking as JSON
    #[arg(long)]
    pub json: bool,
}

impl ScanArgs {
    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        let catalog = ClobCatalog::with_config(ClobCatalogConfig {
            base_url: config.market.api_url.clone(),
            timeout: Duration::from_secs(config.execution.request_timeout_secs),
        })?;
        let markets = catalog
            .fetch_markets(self.limit.unwrap_or(config.market.fetch_limit))
            .await?;

        let cache = Arc::new(PriceCache::new());
        let priced = seed_prices(&cache, &markets);
        let detector = OpportunityDetector::new(Arc::clone(&cache), &config.detector, &config.sizing);
        let found = detector.scan_all();

        let validator =
            OpportunityValidator::new(&config.validator, config.detector.min_edge_threshold);
        let ranked = validator.rank(found);

        tracing::info!(
            markets = markets.len(),
            priced,
            opportunities = ranked.len(),
            "Scan complete"
        );

        if self.json {
            println!("{}", serde_json::to_string_pretty(&ranked)?);
            return Ok(());
        }

        if ranked.is_empty() {
            println!(
                "No opportunities above {} edge across {} priced markets",
                config.detector.min_edge_threshold, priced
            );
            return Ok(());
        }

        println!(
            "{:<68} {:>7} {:>7} {:>7} {:>9} {:>9} {:>7}",
            "market", "yes", "no", "edge", "size", "profit", "score"
        );
        for scored in &ranked {
            let opp = &scored.opportunity;
            println!(
                "{:<68} {:>7} {:>7} {:>7} {:>9} {:>9} {:>7}",
                opp.market_id,
                opp.yes_price,
                opp.no_price,
                opp.edge,
                opp.position_size.round_dp(2),
                opp.expected_profit.round_dp(2),
                scored.score.round_dp(1)
            );
        }
        Ok(())
    }
}
