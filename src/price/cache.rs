//! Price cache with update notifications

use super::{PriceSnapshot, PriceUpdate};
use crate::subscription::{Registry, Subscription};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Latest price snapshot per market
///
/// All mutation goes through [`PriceCache::update`]. Observers receive the
/// full merged snapshot after the write lock has been released.
pub struct PriceCache {
    prices: RwLock<HashMap<String, PriceSnapshot>>,
    observers: Registry<PriceSnapshot>,
}

impl PriceCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            prices: RwLock::new(HashMap::new()),
            observers: Registry::new(),
        }
    }

    /// Merge a partial update into the market's snapshot and notify observers
    pub fn update(&self, market_id: &str, update: PriceUpdate) -> PriceSnapshot {
        let snapshot = {
            let mut prices = self.prices.write();
            let entry = prices
                .entry(market_id.to_string())
                .or_insert_with(|| PriceSnapshot::new(market_id));
            entry.merge(update, Utc::now());
            entry.clone()
        };

        tracing::trace!(
            market = %market_id,
            yes = ?snapshot.yes_price,
            no = ?snapshot.no_price,
            "Price snapshot updated"
        );

        self.observers.publish(&snapshot);
        snapshot
    }

    /// Snapshot for a market
    pub fn get(&self, market_id: &str) -> Option<PriceSnapshot> {
        self.prices.read().get(market_id).cloned()
    }

    /// All snapshots, in no particular order
    pub fn list_all(&self) -> Vec<PriceSnapshot> {
        self.prices.read().values().cloned().collect()
    }

    /// True iff both prices are known for the market
    pub fn is_complete(&self, market_id: &str) -> bool {
        self.prices
            .read()
            .get(market_id)
            .is_some_and(PriceSnapshot::is_complete)
    }

    /// Number of markets with a snapshot
    pub fn len(&self) -> usize {
        self.prices.read().len()
    }

    /// True if no market has reported yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a handler called with every merged snapshot
    pub fn on_update<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&PriceSnapshot) + Send + Sync + 'static,
    {
        self.observers.subscribe(handler)
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new()
    }
}
