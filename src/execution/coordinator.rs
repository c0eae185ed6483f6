//! Paired-order execution
//!
//! One attempt moves through building, signing, submitting and reconciling.
//! Both legs are signed before either is submitted, then submitted
//! concurrently. Nothing is retried; every attempt is recorded.

use super::{
    ExecutionError, ExecutionRecord, ExecutionResult, ExecutionStage, ExecutionStats, LegFill,
    Order, OrderAck, OrderBuilder, OrderSigner, OrderSubmitter, SignedOrder,
};
use crate::market::Side;
use crate::opportunity::Opportunity;
use crate::telemetry::{self, CounterMetric, LatencyMetric};
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Executes opportunities as a YES buy plus a NO buy
pub struct ExecutionCoordinator {
    builder: OrderBuilder,
    signer: Arc<dyn OrderSigner>,
    submitter: Arc<dyn OrderSubmitter>,
    history: Mutex<Vec<ExecutionRecord>>,
}

impl ExecutionCoordinator {
    pub fn new(
        signer: Arc<dyn OrderSigner>,
        submitter: Arc<dyn OrderSubmitter>,
        order_expiry: chrono::Duration,
    ) -> Self {
        Self {
            builder: OrderBuilder::new(signer.address(), order_expiry),
            signer,
            submitter,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Execute one opportunity; errors are captured in the result
    pub async fn execute(&self, opportunity: &Opportunity) -> ExecutionResult {
        let started = Instant::now();
        tracing::info!(
            market = %opportunity.market_id,
            edge = %opportunity.edge,
            position_size = %opportunity.position_size,
            expected_profit = %opportunity.expected_profit,
            "Executing opportunity"
        );

        let result = self.attempt(opportunity).await;
        let elapsed = started.elapsed();
        telemetry::record_latency(LatencyMetric::Execution, elapsed);

        match &result {
            ExecutionResult::Success { yes, no } => {
                telemetry::increment(CounterMetric::ExecutionSuccess, 1);
                tracing::info!(
                    market = %opportunity.market_id,
                    yes_order = %yes.order_id,
                    no_order = %no.order_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Arbitrage executed"
                );
            }
            ExecutionResult::PartialFill { filled, failed } => {
                telemetry::increment(CounterMetric::ExecutionPartialFill, 1);
                tracing::error!(
                    market = %opportunity.market_id,
                    filled_leg = %filled.side,
                    filled_order = %filled.order_id,
                    error = %failed,
                    "Partial fill: position is unhedged"
                );
            }
            ExecutionResult::Failed { stage, errors } => {
                telemetry::increment(CounterMetric::ExecutionFailed, 1);
                tracing::warn!(
                    market = %opportunity.market_id,
                    %stage,
                    errors = ?errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "Execution failed"
                );
            }
        }

        self.history.lock().push(ExecutionRecord {
            opportunity: opportunity.clone(),
            result: result.clone(),
            completed_at: Utc::now(),
            elapsed,
        });

        result
    }

    async fn attempt(&self, opportunity: &Opportunity) -> ExecutionResult {
        let (yes_order, no_order) = match self.builder.build_pair(opportunity, Utc::now()) {
            Ok(orders) => orders,
            Err(e) => return failed(ExecutionStage::Building, vec![e]),
        };

        let signing_started = Instant::now();
        let (yes_signed, no_signed) = tokio::join!(
            self.sign(Side::Yes, yes_order),
            self.sign(Side::No, no_order)
        );
        telemetry::record_latency(LatencyMetric::Signing, signing_started.elapsed());

        let (yes_signed, no_signed) = match (yes_signed, no_signed) {
            (Ok(yes), Ok(no)) => (yes, no),
            (yes, no) => {
                let errors = [yes.err(), no.err()].into_iter().flatten().collect();
                return failed(ExecutionStage::Signing, errors);
            }
        };

        let submit_started = Instant::now();
        let (yes_ack, no_ack) = tokio::join!(self.submit(&yes_signed), self.submit(&no_signed));
        telemetry::record_latency(LatencyMetric::Submission, submit_started.elapsed());

        reconcile(yes_ack, no_ack)
    }

    async fn sign(&self, side: Side, order: Order) -> Result<SignedOrder, ExecutionError> {
        let payload = order.payload().map_err(|e| ExecutionError::Build(e.to_string()))?;
        let signature = self
            .signer
            .sign(&payload)
            .await
            .map_err(|e| ExecutionError::Signing {
                side,
                reason: e.to_string(),
            })?;

        Ok(SignedOrder {
            leg: side,
            order,
            signature,
        })
    }

    async fn submit(&self, signed: &SignedOrder) -> Result<LegFill, ExecutionError> {
        self.submitter
            .submit(signed)
            .await
            .map(|OrderAck { order_id }| LegFill {
                side: signed.leg,
                order_id,
            })
            .map_err(|e| ExecutionError::Submission {
                side: signed.leg,
                reason: e.to_string(),
            })
    }

    /// Aggregates over every recorded attempt
    pub fn stats(&self) -> ExecutionStats {
        ExecutionStats::from_records(&self.history.lock())
    }

    /// All recorded attempts, oldest first
    pub fn history(&self) -> Vec<ExecutionRecord> {
        self.history.lock().clone()
    }

    pub fn address(&self) -> &str {
        self.builder.address()
    }
}

fn failed(stage: ExecutionStage, errors: Vec<ExecutionError>) -> ExecutionResult {
    ExecutionResult::Failed { stage, errors }
}

fn reconcile(
    yes: Result<LegFill, ExecutionError>,
    no: Result<LegFill, ExecutionError>,
) -> ExecutionResult {
    match (yes, no) {
        (Ok(yes), Ok(no)) => ExecutionResult::Success { yes, no },
        (Ok(filled), Err(failed)) | (Err(failed), Ok(filled)) => {
            ExecutionResult::PartialFill { filled, failed }
        }
        (Err(yes), Err(no)) => self::failed(ExecutionStage::Submitting, vec![yes, no]),
    }
}
