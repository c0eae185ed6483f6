//! Opportunity types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profit breakdown for buying `position_size` shares of both sides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArbProfit {
    /// `(yes + no) * size`
    pub total_cost: Decimal,
    /// One side always pays out one per share
    pub payout: Decimal,
    /// `payout - total_cost`
    pub profit: Decimal,
    /// `profit / total_cost * 100`, zero when nothing is spent
    pub profit_pct: Decimal,
}

impl ArbProfit {
    pub fn calculate(yes_price: Decimal, no_price: Decimal, position_size: Decimal) -> Self {
        let total_cost = (yes_price + no_price) * position_size;
        let payout = position_size;
        let profit = payout - total_cost;
        let profit_pct = if total_cost.is_zero() {
            Decimal::ZERO
        } else {
            profit / total_cost * Decimal::ONE_HUNDRED
        };

        Self {
            total_cost,
            payout,
            profit,
            profit_pct,
        }
    }
}

/// A detected arbitrage opportunity on one market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    /// Unique opportunity identifier
    pub id: Uuid,
    /// Market (condition) identifier
    pub market_id: String,
    /// YES price at detection
    pub yes_price: Decimal,
    /// NO price at detection
    pub no_price: Decimal,
    /// YES token, if known at detection
    pub yes_token_id: Option<String>,
    /// NO token, if known at detection
    pub no_token_id: Option<String>,
    /// `1 - (yes + no)`
    pub edge: Decimal,
    /// Shares per leg
    pub position_size: Decimal,
    /// `position_size - (yes + no) * position_size`
    pub expected_profit: Decimal,
    /// Expected profit as a percentage of cost
    pub profit_pct: Decimal,
    /// Detection time
    pub detected_at: DateTime<Utc>,
}

impl Opportunity {
    /// Cost of one share of each side
    pub fn total_price(&self) -> Decimal {
        self.yes_price + self.no_price
    }

    /// Milliseconds since detection
    pub fn age_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.detected_at).num_milliseconds()
    }
}

/// Lifecycle events published by the detector
#[derive(Debug, Clone, PartialEq)]
pub enum OpportunityEvent {
    /// New opportunity, or an existing one replaced by a larger edge
    Detected(Opportunity),
    /// Active opportunity removed because the edge fell below the threshold
    Closed { market_id: String, edge: Decimal },
}

impl OpportunityEvent {
    pub fn market_id(&self) -> &str {
        match self {
            OpportunityEvent::Detected(opportunity) => &opportunity.market_id,
            OpportunityEvent::Closed { market_id, .. } => market_id,
        }
    }
}
