//! Execution types

use crate::market::Side;
use crate::opportunity::Opportunity;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Order direction, encoded as 0 (buy) or 1 (sell) on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl From<OrderSide> for u8 {
    fn from(side: OrderSide) -> Self {
        match side {
            OrderSide::Buy => 0,
            OrderSide::Sell => 1,
        }
    }
}

impl TryFrom<u8> for OrderSide {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OrderSide::Buy),
            1 => Ok(OrderSide::Sell),
            other => Err(format!("invalid order side: {other}")),
        }
    }
}

/// CLOB limit order
///
/// Amounts are USDC base units (6 decimals) as decimal strings. `price` and
/// `size` are kept for reporting and are not part of the signed payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub salt: String,
    pub maker: String,
    pub signer: String,
    pub taker: String,
    pub token_id: String,
    pub maker_amount: String,
    pub taker_amount: String,
    pub side: OrderSide,
    /// Unix seconds
    pub expiration: i64,
    pub nonce: u64,
    pub fee_rate_bps: u32,
    pub signature_type: u8,
    #[serde(skip)]
    pub price: Decimal,
    #[serde(skip)]
    pub size: Decimal,
}

impl Order {
    /// Canonical JSON bytes handed to the signer
    pub fn payload(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Opaque signature over an order payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(pub String);

impl Signature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An order with its signature, tagged with the leg it buys
#[derive(Debug, Clone, PartialEq)]
pub struct SignedOrder {
    pub leg: Side,
    pub order: Order,
    pub signature: Signature,
}

/// Exchange acknowledgement of a submitted order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderAck {
    pub order_id: String,
}

/// Stage an execution attempt reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStage {
    Building,
    Signing,
    Submitting,
    Reconciled,
}

impl std::fmt::Display for ExecutionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExecutionStage::Building => "building",
            ExecutionStage::Signing => "signing",
            ExecutionStage::Submitting => "submitting",
            ExecutionStage::Reconciled => "reconciled",
        };
        f.write_str(name)
    }
}

/// Per-leg execution errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    #[error("order build failed: {0}")]
    Build(String),
    #[error("{side} leg signing failed: {reason}")]
    Signing { side: Side, reason: String },
    #[error("{side} leg submission failed: {reason}")]
    Submission { side: Side, reason: String },
}

/// An accepted leg
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegFill {
    pub side: Side,
    pub order_id: String,
}

/// Outcome of one execution attempt
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    /// Both legs accepted
    Success { yes: LegFill, no: LegFill },
    /// Exactly one leg accepted; the position is unhedged
    PartialFill {
        filled: LegFill,
        failed: ExecutionError,
    },
    /// No leg accepted
    Failed {
        stage: ExecutionStage,
        errors: Vec<ExecutionError>,
    },
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, ExecutionResult::PartialFill { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ExecutionResult::Failed { .. })
    }

    /// Last stage the attempt reached
    pub fn stage(&self) -> ExecutionStage {
        match self {
            ExecutionResult::Success { .. } | ExecutionResult::PartialFill { .. } => {
                ExecutionStage::Reconciled
            }
            ExecutionResult::Failed { stage, .. } => *stage,
        }
    }

    /// Order ids of every accepted leg
    pub fn order_ids(&self) -> Vec<&str> {
        match self {
            ExecutionResult::Success { yes, no } => {
                vec![yes.order_id.as_str(), no.order_id.as_str()]
            }
            ExecutionResult::PartialFill { filled, .. } => vec![filled.order_id.as_str()],
            ExecutionResult::Failed { .. } => vec![],
        }
    }
}

/// Immutable log entry for one execution attempt
#[derive(Debug, Clone)]
pub struct ExecutionRecord {
    pub opportunity: Opportunity,
    pub result: ExecutionResult,
    pub completed_at: DateTime<Utc>,
    pub elapsed: Duration,
}

/// Aggregates over the execution log
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionStats {
    pub total_executions: usize,
    pub successful_executions: usize,
    /// Attempts with no leg accepted
    pub failed_executions: usize,
    pub partial_fills: usize,
    /// Percent of attempts that succeeded, one decimal; `None` before any attempt
    pub success_rate: Option<Decimal>,
    /// Expected profit summed over successful attempts
    pub total_expected_profit: Decimal,
}

impl ExecutionStats {
    pub fn from_records(records: &[ExecutionRecord]) -> Self {
        let total_executions = records.len();
        let successful: Vec<&ExecutionRecord> =
            records.iter().filter(|r| r.result.is_success()).collect();
        let partial_fills = records.iter().filter(|r| r.result.is_partial()).count();
        let failed_executions = records.iter().filter(|r| r.result.is_failed()).count();

        let success_rate = (total_executions > 0).then(|| {
            (Decimal::from(successful.len()) / Decimal::from(total_executions)
                * Decimal::ONE_HUNDRED)
                .round_dp(1)
        });

        Self {
            total_executions,
            successful_executions: successful.len(),
            failed_executions,
            partial_fills,
            success_rate,
            total_expected_profit: successful
                .iter()
                .map(|r| r.opportunity.expected_profit)
                .sum(),
        }
    }
}
