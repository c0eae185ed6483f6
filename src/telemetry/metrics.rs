//! Prometheus metrics

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Full execution attempt, build to reconcile
    Execution,
    /// Signing both legs
    Signing,
    /// Concurrent submission of both legs
    Submission,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Currently active opportunities
    ActiveOpportunities,
    /// Markets with a price snapshot
    TrackedMarkets,
    /// Tokens routed from the feed
    SubscribedTokens,
    /// Executions in flight
    InFlightExecutions,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Ticks parsed from the feed
    FeedTicks,
    /// Feed reconnection attempts
    FeedReconnects,
    /// Opportunities detected or improved
    OpportunitiesDetected,
    /// Opportunities closed by edge decay
    OpportunitiesClosed,
    /// Opportunities dropped for lack of an execution slot
    OpportunitiesDropped,
    /// Opportunities rejected by the validator
    ValidationRejected,
    /// Both legs accepted
    ExecutionSuccess,
    /// Exactly one leg accepted
    ExecutionPartialFill,
    /// No leg accepted
    ExecutionFailed,
}

impl LatencyMetric {
    fn name(self) -> &'static str {
        match self {
            LatencyMetric::Execution => "polyarb_execution_latency_ms",
            LatencyMetric::Signing => "polyarb_signing_latency_ms",
            LatencyMetric::Submission => "polyarb_submission_latency_ms",
        }
    }
}

impl GaugeMetric {
    fn name(self) -> &'static str {
        match self {
            GaugeMetric::ActiveOpportunities => "polyarb_active_opportunities",
            GaugeMetric::TrackedMarkets => "polyarb_tracked_markets",
            GaugeMetric::SubscribedTokens => "polyarb_subscribed_tokens",
            GaugeMetric::InFlightExecutions => "polyarb_inflight_executions",
        }
    }
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            CounterMetric::FeedTicks => "polyarb_feed_ticks_total",
            CounterMetric::FeedReconnects => "polyarb_feed_reconnects_total",
            CounterMetric::OpportunitiesDetected => "polyarb_opportunities_detected_total",
            CounterMetric::OpportunitiesClosed => "polyarb_opportunities_closed_total",
            CounterMetric::OpportunitiesDropped => "polyarb_opportunities_dropped_total",
            CounterMetric::ValidationRejected => "polyarb_validation_rejected_total",
            CounterMetric::ExecutionSuccess => "polyarb_execution_success_total",
            CounterMetric::ExecutionPartialFill => "polyarb_execution_partial_fill_total",
            CounterMetric::ExecutionFailed => "polyarb_execution_failed_total",
        }
    }
}

/// Start the Prometheus HTTP listener on all interfaces
pub fn init_metrics_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    metrics::histogram!(metric.name()).record(duration.as_secs_f64() * 1000.0);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(metric.name()).set(value);
}

/// Add to a counter
pub fn increment(metric: CounterMetric, by: u64) {
    metrics::counter!(metric.name()).increment(by);
}
