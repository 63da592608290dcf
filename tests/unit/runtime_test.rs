//! Tests for tokio spawner and timer adapters

use prometheus_feed_scheduler::core::{Spawn, TimerHandle, TimerScheduler};
use prometheus_feed_scheduler::runtime::{TokioSpawner, TokioTimerScheduler};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[test]
fn test_tokio_spawner_outside_runtime_fails() {
    assert!(TokioSpawner::current().is_err());
    assert!(TokioTimerScheduler::current().is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_timer_fires_immediately_then_stops_when_invalidated() {
    let timers = TokioTimerScheduler::current().unwrap();
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);

    let handle = timers.schedule_repeating(
        Duration::from_secs(3600),
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );

    for _ in 0..200 {
        if fired.load(Ordering::SeqCst) > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(handle.is_valid());

    handle.invalidate();
    assert!(!handle.is_valid());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_timer_repeats() {
    let timers = TokioTimerScheduler::current().unwrap();
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);

    let handle = timers.schedule_repeating(
        Duration::from_millis(10),
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );

    for _ in 0..200 {
        if fired.load(Ordering::SeqCst) >= 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    handle.invalidate();
    assert!(fired.load(Ordering::SeqCst) >= 3);
}
