//! CLOB REST client for market discovery
//!
//! Lists active markets from the CLOB `/markets` endpoint and keeps the ones
//! that expose both a "Yes" and a "No" outcome token.

use super::{MarketCatalog, MarketDescriptor};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// CLOB API base URL
pub const CLOB_API_URL: &str = "https://clob.polymarket.com";

/// Configuration for the catalog client
#[derive(Debug, Clone)]
pub struct ClobCatalogConfig {
    /// Base URL for the CLOB API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for ClobCatalogConfig {
    fn default() -> Self {
        Self {
            base_url: CLOB_API_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Market catalog backed by the CLOB REST API
pub struct ClobCatalog {
    config: ClobCatalogConfig,
    client: Client,
}

impl ClobCatalog {
    /// Create a client with default configuration
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(ClobCatalogConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: ClobCatalogConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Configured base URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

#[async_trait]
impl MarketCatalog for ClobCatalog {
    async fn fetch_markets(&self, limit: usize) -> anyhow::Result<Vec<MarketDescriptor>> {
        let url = format!("{}/markets", self.config.base_url);

        tracing::debug!(url = %url, limit, "Fetching markets from CLOB API");

        let response = self
            .client
            .get(&url)
            .query(&[("limit", limit.to_string()), ("active", "true".to_string())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("CLOB API error: {} - {}", status, body);
        }

        let body: serde_json::Value = response.json().await?;
        let markets = parse_markets_response(body);

        tracing::info!(market_count = markets.len(), "Fetched binary markets");
        Ok(markets)
    }
}

/// `/markets` payload: either `{"data": [...]}` or a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MarketsResponse {
    Wrapped { data: Vec<ClobMarket> },
    Bare(Vec<ClobMarket>),
}

/// Raw market entry from the CLOB API
#[derive(Debug, Deserialize)]
struct ClobMarket {
    condition_id: Option<String>,
    #[serde(default)]
    question: String,
    #[serde(default)]
    tokens: Vec<ClobToken>,
}

/// Outcome token within a market entry
#[derive(Debug, Deserialize)]
struct ClobToken {
    token_id: String,
    outcome: String,
    #[serde(default)]
    price: Option<Decimal>,
}

/// Parse a `/markets` body, skipping entries that are not YES/NO pairs
fn parse_markets_response(body: serde_json::Value) -> Vec<MarketDescriptor> {
    match serde_json::from_value::<MarketsResponse>(body) {
        Ok(MarketsResponse::Wrapped { data }) | Ok(MarketsResponse::Bare(data)) => {
            data.into_iter().filter_map(convert_market).collect()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Unexpected markets response format");
            vec![]
        }
    }
}

/// Convert a raw entry; `None` unless it has an id and both outcome tokens
fn convert_market(market: ClobMarket) -> Option<MarketDescriptor> {
    let market_id = market.condition_id.filter(|id| !id.is_empty())?;
    let yes = market.tokens.iter().find(|t| t.outcome == "Yes")?;
    let no = market.tokens.iter().find(|t| t.outcome == "No")?;

    Some(MarketDescriptor {
        market_id,
        question: market.question,
        yes_token_id: yes.token_id.clone(),
        no_token_id: no.token_id.clone(),
        yes_price: listed_price(yes.price),
        no_price: listed_price(no.price),
    })
}

/// A zero listing means "no price yet"
fn listed_price(price: Option<Decimal>) -> Option<Decimal> {
    price.filter(|p| *p > Decimal::ZERO)
}
