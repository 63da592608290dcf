//! Tests for refill ordering against randomized registrations

use async_trait::async_trait;
use prometheus_feed_scheduler::builders::SchedulerBuilder;
use prometheus_feed_scheduler::config::SchedulerConfig;
use prometheus_feed_scheduler::core::{CancelToken, Feed, FeedId, FeedKey};
use prometheus_feed_scheduler::runtime::ManualTimerScheduler;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

struct NoopFeed;

#[async_trait]
impl Feed for NoopFeed {
    async fn poll_once(&self, _cancel: CancelToken) {}
}

#[test]
fn test_refill_follows_registration_order_after_removals() {
    let mut rng = rand::rng();

    for _ in 0..20 {
        let scheduler = SchedulerBuilder::new(SchedulerConfig::default())
            .core_factory(|_, _| Arc::new(NoopFeed))
            .special_factory(|_| Arc::new(NoopFeed))
            .timer_scheduler(ManualTimerScheduler::new())
            .build()
            .unwrap();
        scheduler.enable_core_loop("u1");

        let count = rng.random_range(1..12);
        let mut ids: Vec<FeedId> = (0..count).map(|n| FeedId::new(format!("feed-{n}"))).collect();
        ids.shuffle(&mut rng);
        for id in &ids {
            scheduler.enable_special_loop(id.clone());
        }

        // Drop a random subset; survivors keep their relative order.
        let mut expected = Vec::new();
        for id in &ids {
            if rng.random_bool(0.3) {
                scheduler.disable_special_loop(id);
            } else {
                expected.push(FeedKey::Special(id.clone()));
            }
        }

        scheduler.refill();
        let mut keys = scheduler.queue().keys();
        assert_eq!(keys.remove(0), FeedKey::Core);
        assert_eq!(keys, expected);

        // Repeated refills never duplicate a feed.
        scheduler.refill();
        scheduler.trigger_core_loop();
        scheduler.refill();
        assert_eq!(scheduler.queue().keys(), vec![FeedKey::Core]);
    }
}
