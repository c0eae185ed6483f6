//! Order construction

use super::{ExecutionError, Order, OrderSide};
use crate::market::Side;
use crate::opportunity::Opportunity;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Zero address: the order may be filled by anyone
pub const OPEN_TAKER: &str = "0x0000000000000000000000000000000000000000";

/// USDC has six decimals
const USDC_UNIT: Decimal = dec!(1000000);

/// Builds signed-ready limit orders for one account
#[derive(Debug, Clone)]
pub struct OrderBuilder {
    address: String,
    expiry: Duration,
}

impl OrderBuilder {
    pub fn new(address: impl Into<String>, expiry: Duration) -> Self {
        Self {
            address: address.into(),
            expiry,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Build one limit order
    ///
    /// BUY spends `size * price` USDC for `size` shares; SELL the reverse.
    pub fn build(
        &self,
        token_id: &str,
        side: OrderSide,
        price: Decimal,
        size: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Order, ExecutionError> {
        if token_id.is_empty() {
            return Err(ExecutionError::Build("empty token id".to_string()));
        }
        if price <= Decimal::ZERO || price > Decimal::ONE {
            return Err(ExecutionError::Build(format!("price {price} outside (0, 1]")));
        }
        if size <= Decimal::ZERO {
            return Err(ExecutionError::Build(format!("non-positive size {size}")));
        }

        let notional = size * price;
        let (maker, taker) = match side {
            OrderSide::Buy => (notional, size),
            OrderSide::Sell => (size, notional),
        };

        let order = Order {
            salt: Uuid::new_v4().as_u128().to_string(),
            maker: self.address.clone(),
            signer: self.address.clone(),
            taker: OPEN_TAKER.to_string(),
            token_id: token_id.to_string(),
            maker_amount: to_base_units(maker)?,
            taker_amount: to_base_units(taker)?,
            side,
            expiration: (now + self.expiry).timestamp(),
            nonce: 0,
            fee_rate_bps: 0,
            signature_type: 0,
            price,
            size,
        };

        tracing::debug!(token = %token_id, ?side, %price, %size, "Order built");
        Ok(order)
    }

    /// Build the YES and NO buy orders for an opportunity
    pub fn build_pair(
        &self,
        opportunity: &Opportunity,
        now: DateTime<Utc>,
    ) -> Result<(Order, Order), ExecutionError> {
        let yes_token = leg_token(opportunity.yes_token_id.as_deref(), Side::Yes)?;
        let no_token = leg_token(opportunity.no_token_id.as_deref(), Side::No)?;

        let yes = self.build(
            yes_token,
            OrderSide::Buy,
            opportunity.yes_price,
            opportunity.position_size,
            now,
        )?;
        let no = self.build(
            no_token,
            OrderSide::Buy,
            opportunity.no_price,
            opportunity.position_size,
            now,
        )?;
        Ok((yes, no))
    }
}

fn leg_token(token: Option<&str>, side: Side) -> Result<&str, ExecutionError> {
    token.ok_or_else(|| ExecutionError::Build(format!("missing {side} token id")))
}

/// Floor to whole USDC base units
fn to_base_units(amount: Decimal) -> Result<String, ExecutionError> {
    (amount * USDC_UNIT)
        .floor()
        .to_u128()
        .map(|units| units.to_string())
        .ok_or_else(|| ExecutionError::Build(format!("amount {amount} not representable")))
}
