//! Integration tests for configuration loading

use poly_arb::config::{Config, ExecutionMode, LogFormat};
use rust_decimal_macros::dec;
use std::io::Write;

#[test]
fn test_example_config_loads() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    config.validate().unwrap();

    assert_eq!(config.execution.mode, ExecutionMode::Paper);
    assert_eq!(config.detector.min_edge_threshold, dec!(0.02));
    assert_eq!(config.sizing.max_position_size, dec!(100));
    assert_eq!(config.bot.max_concurrent_executions, 1);
    assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
    assert!(config.telemetry.metrics_port.is_none());
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [detector]
        min_edge_threshold = 0.03

        [bot]
        max_concurrent_executions = 4
        "#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.detector.min_edge_threshold, dec!(0.03));
    assert_eq!(config.bot.max_concurrent_executions, 4);
    // Untouched sections fall back to defaults
    assert_eq!(config.validator.max_age_ms, 5000);
}

#[test]
fn test_load_rejects_live_without_account() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [execution]
        mode = "live"
        "#
    )
    .unwrap();

    let err = Config::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("account_address"));
}

#[test]
fn test_load_missing_file() {
    assert!(Config::load("/nonexistent/poly-arb.toml").is_err());
}
