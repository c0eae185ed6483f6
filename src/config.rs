//! Configuration types for poly-arb

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub sizing: SizingConfig,
    #[serde(default)]
    pub validator: ValidatorConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Live execution needs an account to sign for
    #[error("live execution requires execution.account_address")]
    MissingAccount,
    /// Live execution needs a signing service
    #[error("live execution requires execution.signer_url")]
    MissingSigner,
    /// A numeric setting is outside its allowed range
    #[error("invalid value for {field}: {value}")]
    OutOfRange { field: &'static str, value: String },
}

/// Live price feed configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    /// Market channel WebSocket URL
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Reconnection attempts before giving up (0 = infinite)
    #[serde(default = "default_max_reconnects")]
    pub max_reconnect_attempts: u32,
    /// Delay before the first reconnection attempt
    #[serde(default = "default_initial_reconnect_delay_ms")]
    pub initial_reconnect_delay_ms: u64,
    /// Ceiling on the reconnection delay
    #[serde(default = "default_max_reconnect_delay_ms")]
    pub max_reconnect_delay_ms: u64,
    /// Keepalive ping interval
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
}

fn default_ws_url() -> String {
    "wss://ws-subscriptions-clob.polymarket.com/ws/market".to_string()
}
fn default_max_reconnects() -> u32 {
    10
}
fn default_initial_reconnect_delay_ms() -> u64 {
    1000
}
fn default_max_reconnect_delay_ms() -> u64 {
    60_000
}
fn default_ping_interval_secs() -> u64 {
    30
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            max_reconnect_attempts: default_max_reconnects(),
            initial_reconnect_delay_ms: default_initial_reconnect_delay_ms(),
            max_reconnect_delay_ms: default_max_reconnect_delay_ms(),
            ping_interval_secs: default_ping_interval_secs(),
        }
    }
}

/// Market catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketConfig {
    /// CLOB REST API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Maximum markets fetched per refresh
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,
    /// Interval between catalog refreshes
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

fn default_api_url() -> String {
    "https://clob.polymarket.com".to_string()
}
fn default_fetch_limit() -> usize {
    200
}
fn default_refresh_interval_secs() -> u64 {
    60
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            fetch_limit: default_fetch_limit(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

/// Opportunity detection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectorConfig {
    /// Minimum edge `1 - (yes + no)` for an opportunity to be active
    #[serde(default = "default_min_edge")]
    pub min_edge_threshold: Decimal,
    /// Interval at which edge statistics are logged and reset
    #[serde(default = "default_stats_interval_secs")]
    pub stats_interval_secs: u64,
}

fn default_min_edge() -> Decimal {
    Decimal::new(2, 2) // 0.02
}
fn default_stats_interval_secs() -> u64 {
    30
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_edge_threshold: default_min_edge(),
            stats_interval_secs: default_stats_interval_secs(),
        }
    }
}

/// Position sizing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SizingConfig {
    /// Capital available for sizing
    #[serde(default = "default_bankroll")]
    pub bankroll: Decimal,
    /// Kelly fraction (e.g., 0.25 for quarter Kelly)
    #[serde(default = "default_kelly_fraction")]
    pub kelly_fraction: Decimal,
    /// Linear scale from edge to bankroll fraction; a tunable heuristic
    #[serde(default = "default_edge_scale")]
    pub edge_scale: Decimal,
    /// Hard ceiling on capital per leg
    #[serde(default = "default_max_position_size")]
    pub max_position_size: Decimal,
}

fn default_bankroll() -> Decimal {
    Decimal::new(10_000, 0)
}
fn default_kelly_fraction() -> Decimal {
    Decimal::new(25, 2) // 0.25
}
fn default_edge_scale() -> Decimal {
    Decimal::new(10, 0)
}
fn default_max_position_size() -> Decimal {
    Decimal::new(100, 0)
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            bankroll: default_bankroll(),
            kelly_fraction: default_kelly_fraction(),
            edge_scale: default_edge_scale(),
            max_position_size: default_max_position_size(),
        }
    }
}

/// Pre-trade validation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidatorConfig {
    /// Maximum opportunity age
    #[serde(default = "default_max_age_ms")]
    pub max_age_ms: i64,
    /// Maximum per-leg move since detection
    #[serde(default = "default_max_price_drift")]
    pub max_price_drift: Decimal,
    /// Absolute profit floor in USD
    #[serde(default = "default_min_expected_profit")]
    pub min_expected_profit: Decimal,
}

fn default_max_age_ms() -> i64 {
    5000
}
fn default_max_price_drift() -> Decimal {
    Decimal::new(1, 2) // 0.01
}
fn default_min_expected_profit() -> Decimal {
    Decimal::new(50, 2) // $0.50
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_age_ms: default_max_age_ms(),
            max_price_drift: default_max_price_drift(),
            min_expected_profit: default_min_expected_profit(),
        }
    }
}

/// Execution configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionConfig {
    /// Paper or live order submission
    #[serde(default)]
    pub mode: ExecutionMode,
    /// CLOB REST API base URL for order submission
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Account address placed in the maker/signer fields
    #[serde(default)]
    pub account_address: Option<String>,
    /// Remote signing service used in live mode
    #[serde(default)]
    pub signer_url: Option<String>,
    /// Order expiration from build time
    #[serde(default = "default_order_expiry_secs")]
    pub order_expiry_secs: i64,
    /// HTTP timeout for order submission
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Execution mode: paper trading or live
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Paper,
    Live,
}

fn default_order_expiry_secs() -> i64 {
    300
}
fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Paper,
            api_url: default_api_url(),
            account_address: None,
            signer_url: None,
            order_expiry_secs: default_order_expiry_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Orchestrator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    /// Executions allowed in flight at once; extra opportunities are dropped
    #[serde(default = "default_max_concurrent_executions")]
    pub max_concurrent_executions: usize,
    /// Interval between stats reports
    #[serde(default = "default_stats_report_interval_secs")]
    pub stats_report_interval_secs: u64,
}

fn default_max_concurrent_executions() -> usize {
    1
}
fn default_stats_report_interval_secs() -> u64 {
    60
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            max_concurrent_executions: default_max_concurrent_executions(),
            stats_report_interval_secs: default_stats_report_interval_secs(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Prometheus exporter port; no exporter when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

impl FeedConfig {
    pub fn initial_reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.initial_reconnect_delay_ms)
    }

    pub fn max_reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.max_reconnect_delay_ms)
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.execution.mode == ExecutionMode::Live
            && self
                .execution
                .account_address
                .as_deref()
                .map_or(true, str::is_empty)
        {
            return Err(ConfigError::MissingAccount);
        }
        if self.execution.mode == ExecutionMode::Live
            && self
                .execution
                .signer_url
                .as_deref()
                .map_or(true, str::is_empty)
        {
            return Err(ConfigError::MissingSigner);
        }
        if self.detector.min_edge_threshold <= Decimal::ZERO {
            return Err(ConfigError::OutOfRange {
                field: "detector.min_edge_threshold",
                value: self.detector.min_edge_threshold.to_string(),
            });
        }
        if self.sizing.kelly_fraction <= Decimal::ZERO || self.sizing.kelly_fraction > Decimal::ONE
        {
            return Err(ConfigError::OutOfRange {
                field: "sizing.kelly_fraction",
                value: self.sizing.kelly_fraction.to_string(),
            });
        }
        if self.feed.ping_interval_secs == 0 {
            return Err(ConfigError::OutOfRange {
                field: "feed.ping_interval_secs",
                value: "0".to_string(),
            });
        }
        if self.market.refresh_interval_secs == 0 {
            return Err(ConfigError::OutOfRange {
                field: "market.refresh_interval_secs",
                value: "0".to_string(),
            });
        }
        if self.bot.stats_report_interval_secs == 0 {
            return Err(ConfigError::OutOfRange {
                field: "bot.stats_report_interval_secs",
                value: "0".to_string(),
            });
        }
        if self.bot.max_concurrent_executions == 0 {
            return Err(ConfigError::OutOfRange {
                field: "bot.max_concurrent_executions",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            [feed]
            ws_url = "wss://example.com/ws"
            max_reconnect_attempts = 5

            [market]
            api_url = "https://clob.example.com"
            fetch_limit = 50
            refresh_interval_secs = 30

            [detector]
            min_edge_threshold = 0.015

            [sizing]
            bankroll = 5000
            kelly_fraction = 0.5
            max_position_size = 250

            [validator]
            max_age_ms = 3000

            [execution]
            mode = "paper"

            [bot]
            max_concurrent_executions = 2

            [telemetry]
            log_level = "debug"
            log_format = "json"
            metrics_port = 9090
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.feed.ws_url, "wss://example.com/ws");
        assert_eq!(config.feed.max_reconnect_attempts, 5);
        assert_eq!(config.market.fetch_limit, 50);
        assert_eq!(config.detector.min_edge_threshold, dec!(0.015));
        assert_eq!(config.sizing.kelly_fraction, dec!(0.5));
        assert_eq!(config.sizing.edge_scale, dec!(10));
        assert_eq!(config.validator.max_age_ms, 3000);
        assert_eq!(config.validator.max_price_drift, dec!(0.01));
        assert_eq!(config.execution.mode, ExecutionMode::Paper);
        assert_eq!(config.bot.max_concurrent_executions, 2);
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
        assert_eq!(config.telemetry.metrics_port, Some(9090));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.detector.min_edge_threshold, dec!(0.02));
        assert_eq!(config.sizing.bankroll, dec!(10000));
        assert_eq!(config.sizing.max_position_size, dec!(100));
        assert_eq!(config.validator.max_age_ms, 5000);
        assert_eq!(config.validator.min_expected_profit, dec!(0.50));
        assert_eq!(config.execution.order_expiry_secs, 300);
        assert_eq!(config.bot.max_concurrent_executions, 1);
        assert!(config.telemetry.metrics_port.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(include_str!("../config.toml.example")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.execution.mode, ExecutionMode::Paper);
    }

    #[test]
    fn test_live_mode_requires_account() {
        let toml = r#"
            [execution]
            mode = "live"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::MissingAccount)));

        let toml = r#"
            [execution]
            mode = "live"
            account_address = "0xabc"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::MissingSigner)));

        let toml = r#"
            [execution]
            mode = "live"
            account_address = "0xabc"
            signer_url = "http://127.0.0.1:7000/sign"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.bot.max_concurrent_executions = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "bot.max_concurrent_executions", .. })
        ));
    }

    #[test]
    fn test_rejects_zero_ping_interval() {
        let mut config = Config::default();
        config.feed.ping_interval_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "feed.ping_interval_secs", .. })
        ));
    }

    #[test]
    fn test_rejects_kelly_fraction_above_one() {
        let mut config = Config::default();
        config.sizing.kelly_fraction = dec!(1.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[detector]\nmin_edge_threshold = 0.03").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.detector.min_edge_threshold, dec!(0.03));
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_feed_durations() {
        let feed = FeedConfig::default();
        assert_eq!(feed.initial_reconnect_delay(), Duration::from_secs(1));
        assert_eq!(feed.max_reconnect_delay(), Duration::from_secs(60));
        assert_eq!(feed.ping_interval(), Duration::from_secs(30));
    }
}
