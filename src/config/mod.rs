//! Configuration models for the feed scheduler.

pub mod scheduler;

pub use scheduler::{SchedulerConfig, DEFAULT_REFILL_PERIOD_SECS, REFILL_PERIOD_ENV};
