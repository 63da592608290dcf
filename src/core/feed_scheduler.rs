//! Binding of one feed to its priority order.

use std::fmt;
use std::sync::Arc;

use super::dispatch_queue::SharedDispatchQueue;
use super::feed::{Feed, FeedId, FeedKey};
use super::operation::PollOperation;

/// Priority order of the core feed.
pub const CORE_ORDER: u64 = 0;

/// Owns one feed and its fixed priority order, and enqueues at most one
/// outstanding poll for it.
pub struct FeedScheduler {
    key: FeedKey,
    order: u64,
    feed: Arc<dyn Feed>,
}

impl FeedScheduler {
    /// Bind the core feed (order 0).
    #[must_use]
    pub fn core(feed: Arc<dyn Feed>) -> Self {
        Self {
            key: FeedKey::Core,
            order: CORE_ORDER,
            feed,
        }
    }

    /// Bind a special feed with the given order.
    #[must_use]
    pub fn special(id: FeedId, order: u64, feed: Arc<dyn Feed>) -> Self {
        Self {
            key: FeedKey::Special(id),
            order,
            feed,
        }
    }

    /// Key used to tag this feed's operations.
    #[must_use]
    pub const fn key(&self) -> &FeedKey {
        &self.key
    }

    /// Sort order among feeds; lower runs first.
    #[must_use]
    pub const fn order(&self) -> u64 {
        self.order
    }

    /// Queue one poll unless one is already pending or running for this feed.
    ///
    /// Returns whether a new operation was appended.
    pub fn enqueue(&self, queue: &SharedDispatchQueue) -> bool {
        let appended = queue
            .push_if_absent(&self.key, || {
                PollOperation::new(self.key.clone(), Arc::clone(&self.feed))
            })
            .is_some();
        if !appended {
            tracing::trace!(feed = %self.key, "poll already outstanding, skipping");
        }
        appended
    }
}

impl fmt::Debug for FeedScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedScheduler")
            .field("key", &self.key)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}
