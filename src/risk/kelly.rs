//! Kelly criterion position sizing
//!
//! For a guaranteed-profit pair, full Kelly would commit the whole bankroll.
//! The sizer instead scales the committed fraction linearly with edge and
//! applies a fractional discount to absorb execution risk (slippage between
//! detection and fill, one leg failing).

use crate::config::SizingConfig;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Fractional Kelly sizer for rebalancing arbitrage
#[derive(Debug, Clone)]
pub struct KellySizer {
    /// Kelly fraction (e.g., 0.25 for quarter Kelly)
    pub fraction: Decimal,
    /// Multiplier from edge to bankroll fraction before the 100% cap
    pub edge_scale: Decimal,
    /// Maximum capital per leg
    pub max_position_size: Decimal,
}

impl KellySizer {
    /// Create a new Kelly sizer
    pub fn new(fraction: Decimal, edge_scale: Decimal, max_position_size: Decimal) -> Self {
        Self {
            fraction,
            edge_scale,
            max_position_size,
        }
    }

    /// Create from SizingConfig
    pub fn from_config(config: &SizingConfig) -> Self {
        Self::new(
            config.kelly_fraction,
            config.edge_scale,
            config.max_position_size,
        )
    }

    /// Bankroll fraction before the fractional discount, capped at 1
    pub fn kelly_fraction(&self, edge: Decimal) -> Decimal {
        if edge <= dec!(0) {
            return dec!(0);
        }
        (edge * self.edge_scale).min(Decimal::ONE)
    }

    /// Uncapped allocation, floored to cents
    pub fn allocation(&self, edge: Decimal, bankroll: Decimal) -> Decimal {
        let raw = bankroll * self.kelly_fraction(edge) * self.fraction;
        raw.round_dp_with_strategy(2, RoundingStrategy::ToNegativeInfinity)
    }

    /// Position size per leg: allocation capped at `max_position_size`
    pub fn calculate(&self, edge: Decimal, bankroll: Decimal) -> Decimal {
        self.allocation(edge, bankroll)
            .min(self.max_position_size)
            .max(dec!(0))
    }
}

impl Default for KellySizer {
    fn default() -> Self {
        Self::new(dec!(0.25), dec!(10), dec!(100))
    }
}
