//! Pre-trade revalidation and ranking

use super::Opportunity;
use crate::config::ValidatorConfig;
use crate::price::PriceSnapshot;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Validation outcome
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid,
    Rejected(RejectReason),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// Why an opportunity was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RejectReason {
    #[error("opportunity too old: {age_ms}ms")]
    Stale { age_ms: i64 },
    #[error("current snapshot is missing a price")]
    MissingPrices,
    #[error("edge evaporated: was {was}, now {now}")]
    EdgeEvaporated { was: Decimal, now: Decimal },
    #[error("prices moved since detection: yes {yes_drift}, no {no_drift}")]
    PriceDrift {
        yes_drift: Decimal,
        no_drift: Decimal,
    },
    #[error("profit too small: ${0}")]
    ProfitTooSmall(Decimal),
}

/// Ranking score components
///
/// `score = min(edge * edge_multiplier, edge_cap)
///        + min(expected_profit, profit_cap)
///        + max(0, freshness_max - age_ms / freshness_decay_ms)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub edge_multiplier: Decimal,
    pub edge_cap: Decimal,
    pub profit_cap: Decimal,
    pub freshness_max: Decimal,
    /// Milliseconds per point of freshness lost
    pub freshness_decay_ms: Decimal,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            edge_multiplier: dec!(1000),
            edge_cap: dec!(50),
            profit_cap: dec!(30),
            freshness_max: dec!(20),
            freshness_decay_ms: dec!(250),
        }
    }
}

/// An opportunity with its ranking score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredOpportunity {
    pub opportunity: Opportunity,
    pub score: Decimal,
}

/// Re-checks opportunities against current prices before execution
#[derive(Debug, Clone)]
pub struct OpportunityValidator {
    min_edge: Decimal,
    max_age_ms: i64,
    max_price_drift: Decimal,
    min_expected_profit: Decimal,
    weights: ScoreWeights,
}

impl OpportunityValidator {
    pub fn new(config: &ValidatorConfig, min_edge: Decimal) -> Self {
        Self {
            min_edge,
            max_age_ms: config.max_age_ms,
            max_price_drift: config.max_price_drift,
            min_expected_profit: config.min_expected_profit,
            weights: ScoreWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Validate as of now
    pub fn validate(
        &self,
        opportunity: &Opportunity,
        current: Option<&PriceSnapshot>,
    ) -> ValidationResult {
        self.validate_at(opportunity, current, Utc::now())
    }

    /// Validate as of `now`
    ///
    /// Checks run in order: age, prices present, per-leg drift, edge, profit
    /// floor. The first failure wins.
    pub fn validate_at(
        &self,
        opportunity: &Opportunity,
        current: Option<&PriceSnapshot>,
        now: DateTime<Utc>,
    ) -> ValidationResult {
        match self.check(opportunity, current, now) {
            Ok(()) => ValidationResult::Valid,
            Err(reason) => ValidationResult::Rejected(reason),
        }
    }

    fn check(
        &self,
        opportunity: &Opportunity,
        current: Option<&PriceSnapshot>,
        now: DateTime<Utc>,
    ) -> Result<(), RejectReason> {
        let age_ms = opportunity.age_ms(now);
        if age_ms > self.max_age_ms {
            return Err(RejectReason::Stale { age_ms });
        }

        if let Some(snapshot) = current {
            let (yes_price, no_price) = snapshot.prices().ok_or(RejectReason::MissingPrices)?;

            let yes_drift = (yes_price - opportunity.yes_price).abs();
            let no_drift = (no_price - opportunity.no_price).abs();
            if yes_drift > self.max_price_drift || no_drift > self.max_price_drift {
                return Err(RejectReason::PriceDrift {
                    yes_drift,
                    no_drift,
                });
            }

            let current_edge = (Decimal::ONE - (yes_price + no_price)).abs();
            if current_edge < self.min_edge {
                return Err(RejectReason::EdgeEvaporated {
                    was: opportunity.edge,
                    now: current_edge,
                });
            }
        }

        if opportunity.expected_profit < self.min_expected_profit {
            return Err(RejectReason::ProfitTooSmall(opportunity.expected_profit));
        }

        Ok(())
    }

    /// Ranking score as of now
    pub fn score(&self, opportunity: &Opportunity) -> Decimal {
        self.score_at(opportunity, Utc::now())
    }

    pub fn score_at(&self, opportunity: &Opportunity, now: DateTime<Utc>) -> Decimal {
        let w = &self.weights;
        let edge_points = (opportunity.edge * w.edge_multiplier).min(w.edge_cap);
        let profit_points = opportunity.expected_profit.min(w.profit_cap);
        let age_ms = Decimal::from(opportunity.age_ms(now).max(0));
        let freshness = (w.freshness_max - age_ms / w.freshness_decay_ms).max(Decimal::ZERO);

        edge_points + profit_points + freshness
    }

    /// Sort by score descending; earlier detection wins ties
    pub fn rank(&self, opportunities: Vec<Opportunity>) -> Vec<ScoredOpportunity> {
        self.rank_at(opportunities, Utc::now())
    }

    pub fn rank_at(
        &self,
        opportunities: Vec<Opportunity>,
        now: DateTime<Utc>,
    ) -> Vec<ScoredOpportunity> {
        let mut scored: Vec<ScoredOpportunity> = opportunities
            .into_iter()
            .map(|opportunity| ScoredOpportunity {
                score: self.score_at(&opportunity, now),
                opportunity,
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.opportunity.detected_at.cmp(&b.opportunity.detected_at))
        });
        scored
    }
}

impl Default for OpportunityValidator {
    fn default() -> Self {
        Self::new(&ValidatorConfig::default(), dec!(0.02))
    }
}
