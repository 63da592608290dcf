//! Tests for configuration validation

use prometheus_feed_scheduler::config::{SchedulerConfig, DEFAULT_REFILL_PERIOD_SECS, REFILL_PERIOD_ENV};
use std::time::Duration;

#[test]
fn test_default_config() {
    let config = SchedulerConfig::default();
    assert_eq!(config.refill_period_secs, DEFAULT_REFILL_PERIOD_SECS);
    assert_eq!(config.refill_period(), Duration::from_secs(60));
    assert!(config.validate().is_ok());
}

#[test]
fn test_zero_refill_period_is_invalid() {
    let config = SchedulerConfig::default().with_refill_period_secs(0);
    assert!(config.validate().is_err());
}

#[test]
fn test_config_from_json() {
    let config = SchedulerConfig::from_json_str(r#"{ "refill_period_secs": 15 }"#).unwrap();
    assert_eq!(config.refill_period(), Duration::from_secs(15));
}

#[test]
fn test_config_from_json_uses_defaults() {
    let config = SchedulerConfig::from_json_str("{}").unwrap();
    assert_eq!(config, SchedulerConfig::default());
}

#[test]
fn test_config_from_json_rejects_invalid() {
    assert!(SchedulerConfig::from_json_str(r#"{ "refill_period_secs": 0 }"#).is_err());
    assert!(SchedulerConfig::from_json_str("not json").is_err());
}

#[test]
fn test_config_from_lookup() {
    let config = SchedulerConfig::from_lookup(|key| {
        (key == REFILL_PERIOD_ENV).then(|| " 120 ".to_string())
    })
    .unwrap();
    assert_eq!(config.refill_period_secs, 120);

    let defaults = SchedulerConfig::from_lookup(|_| None).unwrap();
    assert_eq!(defaults, SchedulerConfig::default());

    assert!(SchedulerConfig::from_lookup(|_| Some("soon".to_string())).is_err());
}
