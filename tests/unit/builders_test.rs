//! Tests for builder modules

use async_trait::async_trait;
use prometheus_feed_scheduler::builders::SchedulerBuilder;
use prometheus_feed_scheduler::config::SchedulerConfig;
use prometheus_feed_scheduler::core::{CancelToken, Feed, SchedulerError, SharedDispatchQueue};
use prometheus_feed_scheduler::runtime::ManualTimerScheduler;
use std::sync::Arc;
use std::time::Duration;

struct NoopFeed;

#[async_trait]
impl Feed for NoopFeed {
    async fn poll_once(&self, _cancel: CancelToken) {}
}

#[test]
fn test_builder_requires_core_factory() {
    let result = SchedulerBuilder::new(SchedulerConfig::default())
        .special_factory(|_| Arc::new(NoopFeed))
        .timer_scheduler(ManualTimerScheduler::new())
        .build();
    assert!(matches!(result, Err(SchedulerError::MissingComponent("core feed factory"))));
}

#[test]
fn test_builder_requires_special_factory() {
    let result = SchedulerBuilder::new(SchedulerConfig::default())
        .core_factory(|_, _| Arc::new(NoopFeed))
        .timer_scheduler(ManualTimerScheduler::new())
        .build();
    assert!(matches!(result, Err(SchedulerError::MissingComponent("special feed factory"))));
}

#[test]
fn test_builder_rejects_invalid_config() {
    let result = SchedulerBuilder::new(SchedulerConfig::default().with_refill_period_secs(0))
        .core_factory(|_, _| Arc::new(NoopFeed))
        .special_factory(|_| Arc::new(NoopFeed))
        .timer_scheduler(ManualTimerScheduler::new())
        .build();
    assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
}

#[test]
fn test_builder_default_timer_needs_runtime() {
    let result = SchedulerBuilder::new(SchedulerConfig::default())
        .core_factory(|_, _| Arc::new(NoopFeed))
        .special_factory(|_| Arc::new(NoopFeed))
        .build();
    assert!(matches!(result, Err(SchedulerError::Backend(_))));
}

#[test]
fn test_builder_uses_supplied_queue_and_period() {
    let queue = Arc::new(SharedDispatchQueue::new());
    let scheduler = SchedulerBuilder::new(SchedulerConfig::default().with_refill_period_secs(5))
        .core_factory(|_, _| Arc::new(NoopFeed))
        .special_factory(|_| Arc::new(NoopFeed))
        .timer_scheduler(ManualTimerScheduler::new())
        .queue(Arc::clone(&queue))
        .build()
        .unwrap();

    assert!(Arc::ptr_eq(scheduler.queue(), &queue));
    assert_eq!(scheduler.refill_period(), Duration::from_secs(5));
    assert!(!scheduler.is_started());
}
