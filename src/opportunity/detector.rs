//! Edge detection and active-opportunity tracking

use super::{ArbProfit, Opportunity, OpportunityEvent};
use crate::config::{DetectorConfig, SizingConfig};
use crate::price::{PriceCache, PriceSnapshot};
use crate::risk::KellySizer;
use crate::subscription::{Registry, Subscription};
use crate::telemetry::{self, CounterMetric, GaugeMetric};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use uuid::Uuid;

/// Rolling edge statistics
///
/// Checks and edge figures reset every stats interval; the opportunity count
/// is cumulative.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeStats {
    /// Complete snapshots evaluated this interval
    pub checks: u64,
    /// Sum of `|edge|` this interval
    pub total_abs_edge: Decimal,
    /// Signed edge with the largest magnitude this interval
    pub max_edge: Decimal,
    /// Evaluations at or above the threshold since start
    pub opportunities_found: u64,
}

impl EdgeStats {
    fn record(&mut self, edge: Decimal) {
        self.checks += 1;
        self.total_abs_edge += edge.abs();
        if edge.abs() > self.max_edge.abs() {
            self.max_edge = edge;
        }
    }

    /// Mean `|edge|` this interval
    pub fn avg_abs_edge(&self) -> Option<Decimal> {
        (self.checks > 0).then(|| self.total_abs_edge / Decimal::from(self.checks))
    }

    fn reset_interval(&mut self) {
        *self = Self {
            opportunities_found: self.opportunities_found,
            ..Default::default()
        };
    }
}

struct DetectorState {
    active: HashMap<String, Opportunity>,
    stats: EdgeStats,
    last_stats_log: DateTime<Utc>,
}

/// Watches price snapshots for YES + NO < 1
///
/// Holds at most one opportunity per market. An opportunity is replaced only
/// by a strictly larger edge and removed the moment the edge drops below
/// `min_edge_threshold`. Events are published after the state lock is
/// released, so handlers may call back into the detector.
pub struct OpportunityDetector {
    cache: Arc<PriceCache>,
    min_edge: Decimal,
    stats_interval: Duration,
    bankroll: Decimal,
    sizer: KellySizer,
    state: Mutex<DetectorState>,
    observers: Registry<OpportunityEvent>,
}

impl OpportunityDetector {
    pub fn new(cache: Arc<PriceCache>, detector: &DetectorConfig, sizing: &SizingConfig) -> Self {
        Self {
            cache,
            min_edge: detector.min_edge_threshold,
            stats_interval: i64::try_from(detector.stats_interval_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
            bankroll: sizing.bankroll,
            sizer: KellySizer::from_config(sizing),
            state: Mutex::new(DetectorState {
                active: HashMap::new(),
                stats: EdgeStats::default(),
                last_stats_log: Utc::now(),
            }),
            observers: Registry::new(),
        }
    }

    /// Subscribe to the price cache
    ///
    /// The cache holds only a weak reference back to the detector.
    pub fn start(self: &Arc<Self>) -> Subscription {
        let weak: Weak<Self> = Arc::downgrade(self);
        let subscription = self.cache.on_update(move |snapshot| {
            if let Some(detector) = weak.upgrade() {
                detector.on_price_update(snapshot);
            }
        });

        tracing::info!(
            min_edge = %self.min_edge,
            max_position_size = %self.sizer.max_position_size,
            bankroll = %self.bankroll,
            "Opportunity detector started"
        );

        subscription
    }

    /// Evaluate one snapshot, publishing any resulting event
    pub fn on_price_update(&self, snapshot: &PriceSnapshot) {
        if let Some(event) = self.evaluate(snapshot) {
            self.observers.publish(&event);
        }
    }

    fn evaluate(&self, snapshot: &PriceSnapshot) -> Option<OpportunityEvent> {
        let (yes_price, no_price) = snapshot.prices()?;
        let edge = Decimal::ONE - (yes_price + no_price);
        let market_id = &snapshot.market_id;

        let mut state = self.state.lock();
        state.stats.record(edge);
        self.maybe_log_stats(&mut state);

        if edge < self.min_edge {
            let closed = state.active.remove(market_id);
            let active = state.active.len();
            drop(state);

            closed?;
            tracing::debug!(market = %market_id, %edge, "Opportunity closed");
            telemetry::increment(CounterMetric::OpportunitiesClosed, 1);
            telemetry::set_gauge(GaugeMetric::ActiveOpportunities, active as f64);
            return Some(OpportunityEvent::Closed {
                market_id: market_id.clone(),
                edge,
            });
        }

        state.stats.opportunities_found += 1;

        if let Some(existing) = state.active.get(market_id) {
            if edge <= existing.edge {
                return None;
            }
        }

        let position_size = self.sizer.calculate(edge, self.bankroll);
        let profit = ArbProfit::calculate(yes_price, no_price, position_size);
        let opportunity = Opportunity {
            id: Uuid::new_v4(),
            market_id: market_id.clone(),
            yes_price,
            no_price,
            yes_token_id: snapshot.yes_token_id.clone(),
            no_token_id: snapshot.no_token_id.clone(),
            edge,
            position_size,
            expected_profit: profit.profit,
            profit_pct: profit.profit_pct,
            detected_at: Utc::now(),
        };

        state.active.insert(market_id.clone(), opportunity.clone());
        let active = state.active.len();
        drop(state);

        tracing::info!(
            market = %market_id,
            %edge,
            yes_price = %yes_price,
            no_price = %no_price,
            total = %(yes_price + no_price),
            position_size = %position_size,
            expected_profit = %profit.profit,
            "Arbitrage opportunity detected"
        );
        telemetry::increment(CounterMetric::OpportunitiesDetected, 1);
        telemetry::set_gauge(GaugeMetric::ActiveOpportunities, active as f64);

        Some(OpportunityEvent::Detected(opportunity))
    }

    fn maybe_log_stats(&self, state: &mut DetectorState) {
        let now = Utc::now();
        if now - state.last_stats_log <= self.stats_interval {
            return;
        }

        let stats = &state.stats;
        tracing::info!(
            checks = stats.checks,
            avg_abs_edge = ?stats.avg_abs_edge(),
            max_edge = %stats.max_edge,
            opportunities_found = stats.opportunities_found,
            threshold = %self.min_edge,
            "Edge statistics"
        );

        state.stats.reset_interval();
        state.last_stats_log = now;
    }

    /// Re-evaluate every cached snapshot in market id order
    pub fn scan_all(&self) -> Vec<Opportunity> {
        let mut snapshots = self.cache.list_all();
        snapshots.sort_by(|a, b| a.market_id.cmp(&b.market_id));

        for snapshot in &snapshots {
            self.on_price_update(snapshot);
        }

        let active = self.active();
        tracing::info!(
            scanned = snapshots.len(),
            opportunities = active.len(),
            "Scan complete"
        );
        active
    }

    /// Active opportunities, sorted by market id
    pub fn active(&self) -> Vec<Opportunity> {
        let mut active: Vec<Opportunity> = self.state.lock().active.values().cloned().collect();
        active.sort_by(|a, b| a.market_id.cmp(&b.market_id));
        active
    }

    /// Active opportunity for a market
    pub fn get(&self, market_id: &str) -> Option<Opportunity> {
        self.state.lock().active.get(market_id).cloned()
    }

    /// Drop the active opportunity for a market without publishing an event
    pub fn remove(&self, market_id: &str) -> Option<Opportunity> {
        let mut state = self.state.lock();
        let removed = state.active.remove(market_id);
        telemetry::set_gauge(GaugeMetric::ActiveOpportunities, state.active.len() as f64);
        removed
    }

    /// Drop the market's active opportunity only if it is still `id`
    ///
    /// A replacement detected in the meantime stays active.
    pub fn remove_if_current(&self, market_id: &str, id: Uuid) -> Option<Opportunity> {
        let mut state = self.state.lock();
        if state.active.get(market_id).map(|o| o.id) != Some(id) {
            return None;
        }
        let removed = state.active.remove(market_id);
        telemetry::set_gauge(GaugeMetric::ActiveOpportunities, state.active.len() as f64);
        removed
    }

    pub fn stats(&self) -> EdgeStats {
        self.state.lock().stats.clone()
    }

    pub fn min_edge(&self) -> Decimal {
        self.min_edge
    }

    /// Register a handler for opportunity events
    pub fn on_opportunity<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&OpportunityEvent) + Send + Sync + 'static,
    {
        self.observers.subscribe(handler)
    }
}
