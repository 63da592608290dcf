//! Tests for error types

use prometheus_feed_scheduler::core::{FeedLoopError, SchedulerError};

#[test]
fn test_invalid_config_error() {
    let err = SchedulerError::InvalidConfig("refill_period_secs must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: refill_period_secs must be greater than 0"
    );
}

#[test]
fn test_missing_component_error() {
    let err = SchedulerError::MissingComponent("core feed factory");
    assert_eq!(format!("{}", err), "missing component: core feed factory");
}

#[test]
fn test_backend_error() {
    let err = SchedulerError::Backend("no tokio runtime".to_string());
    assert_eq!(format!("{}", err), "backend error: no tokio runtime");
}

#[test]
fn test_feed_loop_errors() {
    assert_eq!(
        FeedLoopError::MissingLatestEventId.to_string(),
        "latest event id is missing"
    );
    assert_eq!(FeedLoopError::CacheOutdated.to_string(), "local cache is outdated");
    assert_eq!(
        FeedLoopError::Network("timeout".into()).to_string(),
        "network error: timeout"
    );
    assert_eq!(
        FeedLoopError::PageProcessing("bad json".into()).to_string(),
        "page processing error: bad json"
    );
}
