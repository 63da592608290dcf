//! Tests for utility functions

use prometheus_feed_scheduler::core::{FeedId, FeedKey, UserId};
use prometheus_feed_scheduler::util::{init_tracing, now_ms};

#[test]
fn test_now_ms_is_monotonic_enough() {
    let a = now_ms();
    let b = now_ms();
    assert!(a > 0);
    assert!(b >= a);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
}

#[test]
fn test_ids() {
    let feed: FeedId = "cal-1".into();
    let user = UserId::new(String::from("u1"));
    assert_eq!(feed.as_str(), "cal-1");
    assert_eq!(user.to_string(), "u1");
    assert_eq!(FeedKey::Special(feed).to_string(), "special:cal-1");
}
