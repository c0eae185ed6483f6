//! Price snapshot types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Best-known pair of leg prices for one market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// Market (condition) identifier
    pub market_id: String,
    /// Latest YES price, absent until the YES side has reported
    pub yes_price: Option<Decimal>,
    /// Latest NO price, absent until the NO side has reported
    pub no_price: Option<Decimal>,
    /// YES token identifier
    pub yes_token_id: Option<String>,
    /// NO token identifier
    pub no_token_id: Option<String>,
    /// Time of the last merge
    pub updated_at: DateTime<Utc>,
}

impl PriceSnapshot {
    /// Create an empty snapshot for a market
    pub fn new(market_id: impl Into<String>) -> Self {
        Self {
            market_id: market_id.into(),
            yes_price: None,
            no_price: None,
            yes_token_id: None,
            no_token_id: None,
            updated_at: Utc::now(),
        }
    }

    /// Both prices, if both sides have reported
    pub fn prices(&self) -> Option<(Decimal, Decimal)> {
        Some((self.yes_price?, self.no_price?))
    }

    /// True when both YES and NO prices are known
    pub fn is_complete(&self) -> bool {
        self.prices().is_some()
    }

    /// Cost of buying one share of each side
    pub fn combined_price(&self) -> Option<Decimal> {
        self.prices().map(|(yes, no)| yes + no)
    }

    /// Signed edge: `1 - (yes + no)`
    pub fn edge(&self) -> Option<Decimal> {
        self.combined_price().map(|total| Decimal::ONE - total)
    }

    /// Merge a partial update field by field; untouched fields keep their value
    pub fn merge(&mut self, update: PriceUpdate, at: DateTime<Utc>) {
        if let Some(price) = update.yes_price {
            self.yes_price = Some(price);
        }
        if let Some(price) = update.no_price {
            self.no_price = Some(price);
        }
        if let Some(token) = update.yes_token_id {
            self.yes_token_id = Some(token);
        }
        if let Some(token) = update.no_token_id {
            self.no_token_id = Some(token);
        }
        self.updated_at = at;
    }
}

/// Any subset of snapshot fields to merge into the cache
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceUpdate {
    pub yes_price: Option<Decimal>,
    pub no_price: Option<Decimal>,
    pub yes_token_id: Option<String>,
    pub no_token_id: Option<String>,
}

impl PriceUpdate {
    /// Update carrying only a YES price
    pub fn yes(price: Decimal) -> Self {
        Self {
            yes_price: Some(price),
            ..Default::default()
        }
    }

    /// Update carrying only a NO price
    pub fn no(price: Decimal) -> Self {
        Self {
            no_price: Some(price),
            ..Default::default()
        }
    }

    /// Update carrying both prices
    pub fn both(yes_price: Decimal, no_price: Decimal) -> Self {
        Self {
            yes_price: Some(yes_price),
            no_price: Some(no_price),
            ..Default::default()
        }
    }

    /// Attach both token identifiers
    pub fn with_tokens(
        mut self,
        yes_token_id: impl Into<String>,
        no_token_id: impl Into<String>,
    ) -> Self {
        self.yes_token_id = Some(yes_token_id.into());
        self.no_token_id = Some(no_token_id.into());
        self
    }

    /// Attach the YES token identifier
    pub fn with_yes_token(mut self, token_id: impl Into<String>) -> Self {
        self.yes_token_id = Some(token_id.into());
        self
    }

    /// Attach the NO token identifier
    pub fn with_no_token(mut self, token_id: impl Into<String>) -> Self {
        self.no_token_id = Some(token_id.into());
        self
    }

    /// True if the update carries no fields
    pub fn is_empty(&self) -> bool {
        self.yes_price.is_none()
            && self.no_price.is_none()
            && self.yes_token_id.is_none()
            && self.no_token_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_snapshot_incomplete() {
        let snapshot = PriceSnapshot::new("m1");
        assert_eq!(snapshot.market_id, "m1");
        assert!(!snapshot.is_complete());
        assert!(snapshot.edge().is_none());
    }

    #[test]
    fn test_merge_keeps_other_side() {
        let mut snapshot = PriceSnapshot::new("m1");
        let t0 = Utc::now();
        snapshot.merge(PriceUpdate::yes(dec!(0.47)).with_tokens("y", "n"), t0);
        snapshot.merge(PriceUpdate::no(dec!(0.50)), t0 + Duration::seconds(1));

        assert_eq!(snapshot.yes_price, Some(dec!(0.47)));
        assert_eq!(snapshot.no_price, Some(dec!(0.50)));
        assert_eq!(snapshot.yes_token_id.as_deref(), Some("y"));
        assert_eq!(snapshot.no_token_id.as_deref(), Some("n"));
        assert_eq!(snapshot.updated_at, t0 + Duration::seconds(1));
    }

    #[test]
    fn test_edge_signed() {
        let mut snapshot = PriceSnapshot::new("m1");
        snapshot.merge(PriceUpdate::both(dec!(0.47), dec!(0.50)), Utc::now());
        assert_eq!(snapshot.combined_price(), Some(dec!(0.97)));
        assert_eq!(snapshot.edge(), Some(dec!(0.03)));

        snapshot.merge(PriceUpdate::yes(dec!(0.55)), Utc::now());
        assert_eq!(snapshot.edge(), Some(dec!(-0.05)));
    }

    #[test]
    fn test_update_builders() {
        assert!(PriceUpdate::default().is_empty());
        let update = PriceUpdate::no(dec!(0.4)).with_no_token("n");
        assert!(!update.is_empty());
        assert_eq!(update.no_token_id.as_deref(), Some("n"));
        assert!(update.yes_price.is_none());
    }
}
