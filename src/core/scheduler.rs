//! Periodic scheduler for the core feed and the special feeds.
//!
//! One [`SchedulerCore`] owns a serial [`SharedDispatchQueue`], the refill
//! timer, the core binding and the special-feed registry.
//!
//! - **Refill** (timer driven): runs only on an empty queue and appends the
//!   core feed, then every special feed ascending by order.
//! - **Trigger** (caller driven): discards the whole queue, then appends the
//!   core feed and optionally one special feed.
//!
//! ```rust,ignore
//! let scheduler = SchedulerBuilder::new(SchedulerConfig::default())
//!     .core_factory(|user, disabler| Arc::new(MailFeed::new(user, disabler)))
//!     .special_factory(|id| Arc::new(CalendarFeed::new(id)))
//!     .build()?;
//!
//! scheduler.enable_core_loop("user-1");
//! scheduler.enable_special_loop("calendar-1");
//! scheduler.start();
//! ```

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use super::dispatch_queue::SharedDispatchQueue;
use super::feed::{CoreFeedFactory, FeedId, FeedKey, SpecialFeedFactory, UserId};
use super::feed_scheduler::FeedScheduler;
use super::registry::FeedRegistry;
use super::timer::{TickFn, TimerHandle, TimerScheduler};

struct SchedulerInner {
    refill_period: Duration,
    queue: Arc<SharedDispatchQueue>,
    timers: Arc<dyn TimerScheduler>,
    timer: Mutex<Option<Box<dyn TimerHandle>>>,
    core: RwLock<Option<Arc<FeedScheduler>>>,
    registry: FeedRegistry,
    core_factory: CoreFeedFactory,
    special_factory: SpecialFeedFactory,
}

/// Authority handed to the core feed to switch off special feeds.
///
/// Calling it is equivalent to [`SchedulerCore::disable_special_loop`] and is
/// safe from inside a running poll. Once the scheduler is dropped the handle
/// does nothing.
#[derive(Clone)]
pub struct SpecialFeedDisabler {
    inner: Weak<SchedulerInner>,
}

impl SpecialFeedDisabler {
    /// Ask the scheduler to stop polling the special feed `id`.
    pub fn disable_special_feed(&self, id: &FeedId) {
        if let Some(inner) = self.inner.upgrade() {
            debug!(feed_id = %id, "core feed requested special feed disable");
            inner.disable_special_loop(id);
        }
    }

    /// A handle that is not attached to any scheduler.
    #[must_use]
    pub fn detached() -> Self {
        Self { inner: Weak::new() }
    }
}

impl fmt::Debug for SpecialFeedDisabler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecialFeedDisabler")
            .field("attached", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl SchedulerInner {
    fn stop_timer(&self) {
        if let Some(timer) = self.timer.lock().take() {
            timer.invalidate();
        }
    }

    fn core_scheduler(&self) -> Option<Arc<FeedScheduler>> {
        self.core.read().clone()
    }

    fn disable_special_loop(&self, id: &FeedId) {
        let removed = self.registry.remove(id).is_some();
        let cancelled = self.queue.cancel_matching(&FeedKey::Special(id.clone()));
        debug!(feed_id = %id, removed, cancelled, "special loop disabled");
    }

    fn trigger_core_loop(&self) {
        let cancelled = self.queue.cancel_all();
        let enqueued = self
            .core_scheduler()
            .is_some_and(|core| core.enqueue(&self.queue));
        debug!(cancelled, enqueued, "core loop triggered");
    }

    fn refill(&self) {
        if !self.queue.is_empty() {
            debug!(pending = self.queue.len(), "queue busy, skipping refill");
            return;
        }
        let mut enqueued = 0usize;
        if let Some(core) = self.core_scheduler() {
            enqueued += usize::from(core.enqueue(&self.queue));
        }
        for feed in self.registry.sorted() {
            enqueued += usize::from(feed.enqueue(&self.queue));
        }
        debug!(enqueued, "refill enqueued operations");
    }
}

/// Orchestrates the lifecycle, timer, core binding and special feeds.
pub struct SchedulerCore {
    inner: Arc<SchedulerInner>,
}

impl SchedulerCore {
    /// Assemble a scheduler from its parts. Nothing runs until [`start`](Self::start).
    #[must_use]
    pub fn new(
        refill_period: Duration,
        core_factory: CoreFeedFactory,
        special_factory: SpecialFeedFactory,
        timers: Arc<dyn TimerScheduler>,
        queue: Arc<SharedDispatchQueue>,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                refill_period,
                queue,
                timers,
                timer: Mutex::new(None),
                core: RwLock::new(None),
                registry: FeedRegistry::new(),
                core_factory,
                special_factory,
            }),
        }
    }

    /// Resume the queue and install the refill timer, replacing any timer
    /// left from an earlier `start`.
    pub fn start(&self) {
        self.inner.queue.resume();
        self.inner.stop_timer();

        let weak = Arc::downgrade(&self.inner);
        let tick: TickFn = Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.refill();
            }
        });
        let handle = self
            .inner
            .timers
            .schedule_repeating(self.inner.refill_period, tick);
        *self.inner.timer.lock() = Some(handle);
        info!(refill_period = ?self.inner.refill_period, "feed scheduler started");
    }

    /// Suspend the queue, cancel all pending and running polls, and stop the timer.
    pub fn suspend(&self) {
        self.inner.queue.suspend();
        let cancelled = self.inner.queue.cancel_all();
        self.inner.stop_timer();
        info!(cancelled, "feed scheduler suspended");
    }

    /// Suspend, then forget every special feed. The core binding is kept.
    pub fn reset(&self) {
        self.suspend();
        self.inner.registry.clear();
        info!("feed scheduler reset");
    }

    /// Build the core feed for `user_id`, replacing the current binding.
    ///
    /// Any operation still queued for the previous core feed is cancelled.
    pub fn enable_core_loop(&self, user_id: impl Into<UserId>) {
        let user_id = user_id.into();
        let disabler = SpecialFeedDisabler {
            inner: Arc::downgrade(&self.inner),
        };
        let feed = (self.inner.core_factory)(&user_id, disabler);
        let previous = self
            .inner
            .core
            .write()
            .replace(Arc::new(FeedScheduler::core(feed)));
        if previous.is_some() {
            self.inner.queue.cancel_matching(&FeedKey::Core);
        }
        info!(user_id = %user_id, "core loop enabled");
    }

    /// Build and register a special feed with the next priority order.
    ///
    /// Re-registering a known id cancels the old instance's operations and
    /// replaces it; the replacement gets a fresh order.
    pub fn enable_special_loop(&self, feed_id: impl Into<FeedId>) {
        let feed_id = feed_id.into();
        let feed = (self.inner.special_factory)(&feed_id);
        let (scheduler, replaced) = self.inner.registry.insert(feed_id.clone(), feed);
        if replaced.is_some() {
            self.inner
                .queue
                .cancel_matching(&FeedKey::Special(feed_id.clone()));
        }
        info!(
            feed_id = %feed_id,
            order = scheduler.order(),
            replaced = replaced.is_some(),
            "special loop enabled"
        );
    }

    /// Cancel the special feed's operations and remove it. Unknown ids are ignored.
    pub fn disable_special_loop(&self, feed_id: &FeedId) {
        self.inner.disable_special_loop(feed_id);
    }

    /// Discard everything queued and poll the core feed right away.
    pub fn trigger_core_loop(&self) {
        self.inner.trigger_core_loop();
    }

    /// Discard everything queued, poll the core feed, then the named
    /// special feed if it is registered.
    pub fn trigger_special_loop(&self, feed_id: &FeedId) {
        self.inner.trigger_core_loop();
        match self.inner.registry.get(feed_id) {
            Some(feed) => {
                feed.enqueue(&self.inner.queue);
            }
            None => debug!(feed_id = %feed_id, "trigger for unknown special loop ignored"),
        }
    }

    /// Run one refill pass: the same routine the timer runs on each fire.
    pub fn refill(&self) {
        self.inner.refill();
    }

    /// Whether a refill timer is installed.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.inner
            .timer
            .lock()
            .as_ref()
            .is_some_and(|timer| timer.is_valid())
    }

    /// Whether a core feed is bound.
    #[must_use]
    pub fn has_core_loop(&self) -> bool {
        self.inner.core.read().is_some()
    }

    /// Registered special feed ids, ascending by order.
    #[must_use]
    pub fn special_loop_ids(&self) -> Vec<FeedId> {
        self.inner
            .registry
            .sorted()
            .iter()
            .filter_map(|s| s.key().feed_id().cloned())
            .collect()
    }

    /// The shared dispatch queue.
    #[must_use]
    pub fn queue(&self) -> &Arc<SharedDispatchQueue> {
        &self.inner.queue
    }

    /// Configured refill period.
    #[must_use]
    pub fn refill_period(&self) -> Duration {
        self.inner.refill_period
    }
}

impl Drop for SchedulerCore {
    fn drop(&mut self) {
        self.inner.stop_timer();
        self.inner.queue.close();
    }
}

impl fmt::Debug for SchedulerCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerCore")
            .field("refill_period", &self.inner.refill_period)
            .field("started", &self.is_started())
            .field("core", &self.has_core_loop())
            .field("special", &self.special_loop_ids())
            .field("queued", &self.inner.queue.len())
            .finish()
    }
}
