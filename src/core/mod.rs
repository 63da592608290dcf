//! Core scheduling abstractions: feeds, operations, queue, registry and scheduler.

pub mod error;
pub mod feed;
pub mod operation;
pub mod dispatch_queue;
pub mod feed_scheduler;
pub mod registry;
pub mod timer;
pub mod scheduler;

pub use error::{AppResult, FeedLoopError, SchedulerError};
pub use feed::{CoreFeedFactory, Feed, FeedId, FeedKey, SpecialFeedFactory, UserId};
pub use operation::{CancelToken, OperationState, PollOperation};
pub use dispatch_queue::{SharedDispatchQueue, Spawn};
pub use feed_scheduler::{FeedScheduler, CORE_ORDER};
pub use registry::FeedRegistry;
pub use timer::{TickFn, TimerHandle, TimerScheduler};
pub use scheduler::{SchedulerCore, SpecialFeedDisabler};
