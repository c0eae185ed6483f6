//! Market catalog module
//!
//! Resolves active binary markets to their YES/NO token pairs and seeds the
//! price cache with the catalog's last known prices.

mod clob;

pub use clob::{ClobCatalog, ClobCatalogConfig};

use crate::price::{PriceCache, PriceSnapshot, PriceUpdate};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One side of a binary market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// YES outcome token
    Yes,
    /// NO outcome token
    No,
}

impl Side {
    /// The complementary side
    pub fn other(self) -> Self {
        match self {
            Side::Yes => Side::No,
            Side::No => Side::Yes,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Yes => write!(f, "yes"),
            Side::No => write!(f, "no"),
        }
    }
}

/// A binary market as listed by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDescriptor {
    /// Condition identifier
    pub market_id: String,
    /// Human readable question
    pub question: String,
    /// YES token identifier
    pub yes_token_id: String,
    /// NO token identifier
    pub no_token_id: String,
    /// Catalog YES price, if listed
    pub yes_price: Option<Decimal>,
    /// Catalog NO price, if listed
    pub no_price: Option<Decimal>,
}

impl MarketDescriptor {
    /// Token identifier for a side
    pub fn token_id(&self, side: Side) -> &str {
        match side {
            Side::Yes => &self.yes_token_id,
            Side::No => &self.no_token_id,
        }
    }
}

/// Source of active market descriptors
#[async_trait]
pub trait MarketCatalog: Send + Sync {
    /// Fetch up to `limit` active markets
    async fn fetch_markets(&self, limit: usize) -> anyhow::Result<Vec<MarketDescriptor>>;
}

/// Seed the cache from catalog descriptors
///
/// Token identifiers are always recorded; prices only when the catalog lists
/// both sides, so a half-priced listing never looks like a live quote.
/// Markets already holding a complete quote keep it, and markets with nothing
/// new to record are left untouched.
/// Returns the number of markets seeded with prices.
pub fn seed_prices(cache: &PriceCache, markets: &[MarketDescriptor]) -> usize {
    let mut priced = 0;
    for market in markets {
        let current = cache.get(&market.market_id);
        let complete = current.as_ref().is_some_and(PriceSnapshot::is_complete);
        let update = match (market.yes_price, market.no_price) {
            (Some(yes), Some(no)) if !complete => {
                priced += 1;
                PriceUpdate::both(yes, no)
            }
            _ if current.as_ref().is_some_and(|s| has_tokens(s, market)) => continue,
            _ => PriceUpdate::default(),
        };
        cache.update(
            &market.market_id,
            update.with_tokens(&market.yes_token_id, &market.no_token_id),
        );
    }
    priced
}

fn has_tokens(snapshot: &PriceSnapshot, market: &MarketDescriptor) -> bool {
    snapshot.yes_token_id.as_deref() == Some(market.yes_token_id.as_str())
        && snapshot.no_token_id.as_deref() == Some(market.no_token_id.as_str())
}
