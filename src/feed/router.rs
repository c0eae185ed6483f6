//! Token to market routing

use super::PriceTick;
use crate::market::{MarketDescriptor, Side};
use crate::price::{PriceCache, PriceSnapshot, PriceUpdate};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Maps outcome tokens to the market side they price
#[derive(Default)]
pub struct TokenRouter {
    routes: RwLock<HashMap<String, (String, Side)>>,
}

impl TokenRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register both tokens of each market, returning how many tokens were new
    pub fn register(&self, markets: &[MarketDescriptor]) -> usize {
        let mut routes = self.routes.write();
        let before = routes.len();
        for market in markets {
            for side in [Side::Yes, Side::No] {
                routes.insert(
                    market.token_id(side).to_string(),
                    (market.market_id.clone(), side),
                );
            }
        }
        routes.len() - before
    }

    /// Market and side for a token
    pub fn route(&self, token_id: &str) -> Option<(String, Side)> {
        self.routes.read().get(token_id).cloned()
    }

    /// Every registered token, sorted
    pub fn token_ids(&self) -> Vec<String> {
        let mut tokens: Vec<String> = self.routes.read().keys().cloned().collect();
        tokens.sort();
        tokens
    }

    pub fn len(&self) -> usize {
        self.routes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply a tick to the cache as a one-sided update
    ///
    /// Ticks for unknown tokens are ignored and return `None`.
    pub fn apply(&self, cache: &PriceCache, tick: &PriceTick) -> Option<PriceSnapshot> {
        let Some((market_id, side)) = self.route(&tick.token_id) else {
            tracing::debug!(token = %tick.token_id, "Tick for unknown token");
            return None;
        };

        let update = match side {
            Side::Yes => PriceUpdate::yes(tick.price).with_yes_token(&tick.token_id),
            Side::No => PriceUpdate::no(tick.price).with_no_token(&tick.token_id),
        };

        Some(cache.update(&market_id, update))
    }
}
