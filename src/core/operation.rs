//! Poll operations and cooperative cancellation.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use uuid::Uuid;

use super::feed::{Feed, FeedKey};
use crate::util::clock::now_ms;

/// Lifecycle of a poll operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationState {
    /// Queued, not started.
    Pending,
    /// Feed call in progress.
    Running,
    /// Feed call returned.
    Finished,
    /// Cancelled before or while running.
    Cancelled,
}

impl OperationState {
    /// Finished and cancelled operations are terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }
}

struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Best-effort cancellation signal handed to a running feed.
///
/// Cloning is cheap; all clones observe the same signal.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

impl CancelToken {
    /// Create a token that has not fired.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CancelInner {
                cancelled: AtomicBool::new(false),
                notify: Notify::new(),
            }),
        }
    }

    /// Fire the signal. Idempotent.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::AcqRel) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Whether the signal has fired.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Resolves once the signal fires.
    pub async fn cancelled(&self) {
        loop {
            // Register before checking the flag so a concurrent cancel is not missed.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// A single-shot "fetch and apply one batch" unit of work for one feed.
pub struct PollOperation {
    id: Uuid,
    key: FeedKey,
    created_at_ms: u128,
    state: Mutex<OperationState>,
    cancel: CancelToken,
    feed: Arc<dyn Feed>,
}

impl PollOperation {
    /// Create a pending operation that will poll `feed` once.
    #[must_use]
    pub fn new(key: FeedKey, feed: Arc<dyn Feed>) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            key,
            created_at_ms: now_ms(),
            state: Mutex::new(OperationState::Pending),
            cancel: CancelToken::new(),
            feed,
        })
    }

    /// Unique operation id.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Feed this operation belongs to.
    #[must_use]
    pub const fn key(&self) -> &FeedKey {
        &self.key
    }

    /// Creation time in milliseconds since epoch.
    #[must_use]
    pub const fn created_at_ms(&self) -> u128 {
        self.created_at_ms
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> OperationState {
        *self.state.lock()
    }

    /// Whether the operation is finished or cancelled.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }

    /// Cancel the operation.
    ///
    /// A pending operation never runs. A running one is marked cancelled and
    /// its feed receives the cooperative signal; how fast it stops is up to
    /// the feed.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        let current = *state;
        match current {
            OperationState::Pending => *state = OperationState::Cancelled,
            OperationState::Running => {
                *state = OperationState::Cancelled;
                drop(state);
                self.cancel.cancel();
            }
            OperationState::Finished | OperationState::Cancelled => {}
        }
    }

    /// Move pending -> running. Returns false if the operation was cancelled first.
    pub(crate) fn begin(&self) -> bool {
        let mut state = self.state.lock();
        if *state == OperationState::Pending {
            *state = OperationState::Running;
            true
        } else {
            false
        }
    }

    /// Run the feed call. Must be preceded by a successful `begin`.
    pub(crate) async fn execute(&self) {
        self.feed.poll_once(self.cancel.clone()).await;
        let mut state = self.state.lock();
        if *state == OperationState::Running {
            *state = OperationState::Finished;
        }
    }
}

impl fmt::Debug for PollOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollOperation")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
