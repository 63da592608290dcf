//! Concurrency-safe registry of special feeds.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::feed::{Feed, FeedId};
use super::feed_scheduler::FeedScheduler;

struct RegistryState {
    feeds: HashMap<FeedId, Arc<FeedScheduler>>,
    /// Next order to hand out. Never decremented, so orders are never reused.
    next_order: u64,
}

/// Mapping from feed id to its scheduler.
///
/// Every access goes through one mutex and iteration happens over a
/// snapshot, so removals may arrive at any time, including from inside a
/// running poll.
pub struct FeedRegistry {
    state: Mutex<RegistryState>,
}

impl FeedRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                feeds: HashMap::new(),
                next_order: 0,
            }),
        }
    }

    /// Register `feed` under `id` with the next priority order.
    ///
    /// Returns the new scheduler and the one it replaced, if `id` was already present.
    pub fn insert(
        &self,
        id: FeedId,
        feed: Arc<dyn Feed>,
    ) -> (Arc<FeedScheduler>, Option<Arc<FeedScheduler>>) {
        let mut state = self.state.lock();
        let order = state.next_order;
        state.next_order += 1;
        let scheduler = Arc::new(FeedScheduler::special(id.clone(), order, feed));
        let replaced = state.feeds.insert(id, Arc::clone(&scheduler));
        (scheduler, replaced)
    }

    /// Remove the scheduler for `id`.
    pub fn remove(&self, id: &FeedId) -> Option<Arc<FeedScheduler>> {
        self.state.lock().feeds.remove(id)
    }

    /// Look up the scheduler for `id`.
    #[must_use]
    pub fn get(&self, id: &FeedId) -> Option<Arc<FeedScheduler>> {
        self.state.lock().feeds.get(id).cloned()
    }

    /// Drop every entry. Orders already handed out stay retired.
    pub fn clear(&self) {
        self.state.lock().feeds.clear();
    }

    /// Snapshot of all schedulers, ascending by order.
    #[must_use]
    pub fn sorted(&self) -> Vec<Arc<FeedScheduler>> {
        let mut feeds: Vec<_> = self.state.lock().feeds.values().cloned().collect();
        feeds.sort_by_key(|s| s.order());
        feeds
    }

    /// Number of registered feeds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().feeds.len()
    }

    /// True when no special feed is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FeedRegistry {
    fn default() -> Self {
        Self::new()
    }
}
