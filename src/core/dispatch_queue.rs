//! Serial dispatch queue shared by every feed of one scheduler.
//!
//! Operations run one at a time in append order. The queue lock is never
//! held while a feed executes, so a running poll may call back into the
//! scheduler (e.g. to disable another feed) without deadlocking.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use super::feed::FeedKey;
use super::operation::{OperationState, PollOperation};

/// Abstraction for spawning the queue driver on a runtime.
pub trait Spawn {
    /// Spawn a detached future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

struct QueueState {
    /// Pending operations plus the one currently running, in append order.
    operations: VecDeque<Arc<PollOperation>>,
    suspended: bool,
    executing: bool,
    closed: bool,
}

/// Ordered, serial execution context for poll operations.
pub struct SharedDispatchQueue {
    state: Mutex<QueueState>,
    wake: Notify,
}

/// Clears the executing flag even if the driving future is dropped mid-poll.
struct ExecutionGuard<'a> {
    queue: &'a SharedDispatchQueue,
    op: Arc<PollOperation>,
}

impl Drop for ExecutionGuard<'_> {
    fn drop(&mut self) {
        {
            let mut state = self.queue.state.lock();
            state.executing = false;
            state.operations.retain(|o| !Arc::ptr_eq(o, &self.op));
        }
        self.queue.wake.notify_one();
    }
}

impl SharedDispatchQueue {
    /// Create an empty, resumed queue with no driver attached.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                operations: VecDeque::new(),
                suspended: false,
                executing: false,
                closed: false,
            }),
            wake: Notify::new(),
        }
    }

    /// Whether queued operations are held dormant.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.state.lock().suspended
    }

    /// Stop starting new operations. A running operation is unaffected.
    pub fn suspend(&self) {
        self.state.lock().suspended = true;
    }

    /// Allow queued operations to start again.
    pub fn resume(&self) {
        self.state.lock().suspended = false;
        self.wake.notify_one();
    }

    /// Snapshot of pending and running operations, in execution order.
    #[must_use]
    pub fn operations(&self) -> Vec<Arc<PollOperation>> {
        self.state
            .lock()
            .operations
            .iter()
            .filter(|op| !op.is_terminal())
            .cloned()
            .collect()
    }

    /// Feed keys of the current operations, in execution order.
    #[must_use]
    pub fn keys(&self) -> Vec<FeedKey> {
        self.operations().iter().map(|op| op.key().clone()).collect()
    }

    /// Number of pending and running operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .operations
            .iter()
            .filter(|op| !op.is_terminal())
            .count()
    }

    /// True when nothing is pending or running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a non-terminal operation for `key` is queued or running.
    #[must_use]
    pub fn contains(&self, key: &FeedKey) -> bool {
        self.state
            .lock()
            .operations
            .iter()
            .any(|op| op.key() == key && !op.is_terminal())
    }

    /// Append the operation built by `make` unless one for `key` is already
    /// outstanding. The check and the append happen under one lock.
    pub fn push_if_absent<F>(&self, key: &FeedKey, make: F) -> Option<Arc<PollOperation>>
    where
        F: FnOnce() -> Arc<PollOperation>,
    {
        let op = {
            let mut state = self.state.lock();
            if state
                .operations
                .iter()
                .any(|op| op.key() == key && !op.is_terminal())
            {
                return None;
            }
            let op = make();
            state.operations.push_back(Arc::clone(&op));
            op
        };
        self.wake.notify_one();
        Some(op)
    }

    /// Cancel every pending and running operation. Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let mut state = self.state.lock();
        let mut cancelled = 0;
        for op in state.operations.drain(..) {
            if !op.is_terminal() {
                op.cancel();
                cancelled += 1;
            }
        }
        cancelled
    }

    /// Cancel operations tagged with `key`. Returns how many were cancelled.
    pub fn cancel_matching(&self, key: &FeedKey) -> usize {
        let mut state = self.state.lock();
        let mut cancelled = 0;
        state.operations.retain(|op| {
            if op.key() != key {
                return true;
            }
            if !op.is_terminal() {
                op.cancel();
                cancelled += 1;
            }
            false
        });
        cancelled
    }

    /// Run the next pending operation.
    ///
    /// Returns false without doing anything when the queue is suspended,
    /// another operation is executing, or nothing is pending.
    pub async fn run_next(&self) -> bool {
        let op = {
            let mut state = self.state.lock();
            if state.suspended || state.executing {
                return false;
            }
            state.operations.retain(|op| !op.is_terminal());
            let Some(op) = state
                .operations
                .iter()
                .find(|op| op.state() == OperationState::Pending && op.begin())
                .cloned()
            else {
                return false;
            };
            state.executing = true;
            op
        };
        let guard = ExecutionGuard {
            queue: self,
            op: Arc::clone(&op),
        };
        tracing::debug!(feed = %op.key(), op_id = %op.id(), "poll operation started");
        op.execute().await;
        tracing::debug!(feed = %op.key(), op_id = %op.id(), state = ?op.state(), "poll operation ended");
        drop(guard);
        true
    }

    /// Run operations until nothing is runnable. Returns how many ran.
    ///
    /// This is the synchronous hosting mode: no driver is needed and the
    /// caller decides when the queue makes progress.
    pub async fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.run_next().await {
            ran += 1;
        }
        ran
    }

    /// Host the queue on a background driver that runs operations as they
    /// arrive. The driver exits after `close`.
    pub fn spawn_driver<S: Spawn>(self: &Arc<Self>, spawner: &S) {
        let queue = Arc::clone(self);
        spawner.spawn(async move {
            tracing::debug!("dispatch queue driver started");
            loop {
                while queue.run_next().await {}
                if queue.is_closed() {
                    break;
                }
                queue.wake.notified().await;
                if queue.is_closed() {
                    break;
                }
            }
            tracing::debug!("dispatch queue driver stopped");
        });
    }

    /// Stop the background driver, if any. Queued operations are left in place.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.wake.notify_one();
    }

    /// Whether `close` has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl Default for SharedDispatchQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::feed::Feed;
    use crate::core::operation::CancelToken;
    use async_trait::async_trait;

    struct RecordingFeed {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Feed for RecordingFeed {
        async fn poll_once(&self, _cancel: CancelToken) {
            self.log.lock().push(self.name);
        }
    }

    fn op(key: FeedKey, name: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> Arc<PollOperation> {
        PollOperation::new(
            key,
            Arc::new(RecordingFeed {
                name,
                log: Arc::clone(log),
            }),
        )
    }

    #[tokio::test]
    async fn runs_in_append_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let queue = SharedDispatchQueue::new();
        queue.push_if_absent(&FeedKey::Core, || op(FeedKey::Core, "core", &log));
        let a = FeedKey::Special("a".into());
        let b = FeedKey::Special("b".into());
        queue.push_if_absent(&a, || op(a.clone(), "a", &log));
        queue.push_if_absent(&b, || op(b.clone(), "b", &log));

        assert_eq!(queue.run_until_idle().await, 3);
        assert_eq!(*log.lock(), vec!["core", "a", "b"]);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn push_if_absent_deduplicates() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let queue = SharedDispatchQueue::new();
        assert!(queue.push_if_absent(&FeedKey::Core, || op(FeedKey::Core, "core", &log)).is_some());
        assert!(queue.push_if_absent(&FeedKey::Core, || op(FeedKey::Core, "core", &log)).is_none());
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test]
    async fn suspended_queue_stays_dormant() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let queue = SharedDispatchQueue::new();
        queue.suspend();
        queue.push_if_absent(&FeedKey::Core, || op(FeedKey::Core, "core", &log));
        assert_eq!(queue.run_until_idle().await, 0);
        assert_eq!(queue.len(), 1);

        queue.resume();
        assert_eq!(queue.run_until_idle().await, 1);
        assert_eq!(*log.lock(), vec!["core"]);
    }

    #[tokio::test]
    async fn cancel_matching_leaves_other_feeds() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let queue = SharedDispatchQueue::new();
        let a = FeedKey::Special("a".into());
        let b = FeedKey::Special("b".into());
        let first = queue.push_if_absent(&a, || op(a.clone(), "a", &log)).unwrap();
        queue.push_if_absent(&b, || op(b.clone(), "b", &log));

        assert_eq!(queue.cancel_matching(&a), 1);
        assert_eq!(first.state(), OperationState::Cancelled);
        assert_eq!(queue.keys(), vec![b]);
        assert_eq!(queue.cancel_matching(&a), 0);
    }

    #[tokio::test]
    async fn cancel_all_empties_queue() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let queue = SharedDispatchQueue::new();
        let a = FeedKey::Special("a".into());
        queue.push_if_absent(&FeedKey::Core, || op(FeedKey::Core, "core", &log));
        queue.push_if_absent(&a, || op(a.clone(), "a", &log));

        assert_eq!(queue.cancel_all(), 2);
        assert!(queue.is_empty());
        assert_eq!(queue.run_until_idle().await, 0);
        assert!(log.lock().is_empty());
    }
}
