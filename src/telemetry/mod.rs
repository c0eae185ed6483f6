//! Telemetry module
//!
//! Structured logging and Prometheus metrics

mod logging;
mod metrics;

pub use logging::init_logging;
pub use metrics::{
    increment, init_metrics_exporter, record_latency, set_gauge, CounterMetric, GaugeMetric,
    LatencyMetric,
};

use crate::config::TelemetryConfig;

/// Handle kept alive for the lifetime of the process
pub struct TelemetryGuard {
    /// Port the Prometheus exporter listens on, if started
    pub metrics_port: Option<u16>,
}

/// Initialize logging and, when a port is configured, the metrics exporter
///
/// Must be called from within a Tokio runtime when `metrics_port` is set.
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    init_logging(&config.log_level, config.log_format)?;

    if let Some(port) = config.metrics_port {
        init_metrics_exporter(port)?;
        tracing::info!(port, "Prometheus exporter listening");
    }

    Ok(TelemetryGuard {
        metrics_port: config.metrics_port,
    })
}
