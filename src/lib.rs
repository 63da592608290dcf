//! # Prometheus Feed Scheduler
//!
//! A periodic polling scheduler that keeps several incremental data feeds in
//! sync through one serial dispatch queue.
//!
//! There is always one **core** feed, bound to a user, plus any number of
//! **special** feeds, each scoped to a sub-resource and identified by a
//! [`FeedId`](crate::core::FeedId). Feeds only expose "poll once"; what they fetch,
//! how they apply it and where they keep their cursor is their own business.
//!
//! ## Guarantees
//!
//! - **One poll in flight per feed**: enqueue is idempotent per feed.
//! - **Strict priority**: every refill appends the core feed first, then
//!   special feeds in ascending registration order. Orders are never reused.
//! - **Serial execution**: one poll runs at a time across all feeds, in
//!   append order, so feeds can share a rate-limited transport.
//! - **Idle-gated refills**: the timer only adds work when the queue is empty.
//! - **Triggers jump the queue**: a trigger discards everything queued and
//!   polls the core feed (and optionally one special feed) right away.
//! - **Reentrant disable**: the core feed may disable a special feed from
//!   inside its own poll.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use prometheus_feed_scheduler::builders::SchedulerBuilder;
//! use prometheus_feed_scheduler::config::SchedulerConfig;
//! use prometheus_feed_scheduler::runtime::TokioSpawner;
//!
//! let scheduler = SchedulerBuilder::new(SchedulerConfig::from_env()?)
//!     .core_factory(|user, disabler| Arc::new(MailFeed::new(user.clone(), disabler)))
//!     .special_factory(|id| Arc::new(CalendarFeed::new(id.clone())))
//!     .spawn_driver_with(TokioSpawner::current()?)
//!     .build()?;
//!
//! scheduler.enable_core_loop("user-1");
//! scheduler.enable_special_loop("calendar-1");
//! scheduler.start();
//!
//! // User opened the calendar: poll it now.
//! scheduler.trigger_special_loop(&"calendar-1".into());
//! ```
//!
//! For deterministic hosting, pair
//! [`ManualTimerScheduler`](crate::runtime::ManualTimerScheduler) with
//! [`SharedDispatchQueue::run_until_idle`](crate::core::SharedDispatchQueue::run_until_idle);
//! see `tests/scheduler_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: feeds, operations, queue, registry, scheduler.
pub mod core;
/// Configuration models for the scheduler.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// Feed adapters built on the `Feed` capability.
pub mod infra;
/// Runtime adapters: spawners and timers.
pub mod runtime;
/// Shared utilities.
pub mod util;
