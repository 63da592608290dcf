//! Builder assembling a `SchedulerCore` from configuration and factories.

use std::sync::Arc;

use crate::config::SchedulerConfig;
use crate::core::{
    CoreFeedFactory, Feed, FeedId, SchedulerCore, SchedulerError, SharedDispatchQueue, Spawn,
    SpecialFeedDisabler, SpecialFeedFactory, TimerScheduler, UserId,
};

type DriverHook = Box<dyn FnOnce(&Arc<SharedDispatchQueue>) + Send>;

/// Builds a [`SchedulerCore`].
///
/// Both feed factories are required. Without an explicit timer scheduler the
/// builder uses a tokio interval timer on the current runtime (when the
/// `tokio-runtime` feature is on). Without a driver the queue is left in
/// manual mode and only advances through `run_next`/`run_until_idle`.
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    core_factory: Option<CoreFeedFactory>,
    special_factory: Option<SpecialFeedFactory>,
    timers: Option<Arc<dyn TimerScheduler>>,
    queue: Option<Arc<SharedDispatchQueue>>,
    driver: Option<DriverHook>,
}

impl SchedulerBuilder {
    /// Start a builder from configuration.
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            core_factory: None,
            special_factory: None,
            timers: None,
            queue: None,
            driver: None,
        }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Factory for the core feed.
    #[must_use]
    pub fn core_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&UserId, SpecialFeedDisabler) -> Arc<dyn Feed> + Send + Sync + 'static,
    {
        self.core_factory = Some(Arc::new(factory));
        self
    }

    /// Factory for special feeds.
    #[must_use]
    pub fn special_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&FeedId) -> Arc<dyn Feed> + Send + Sync + 'static,
    {
        self.special_factory = Some(Arc::new(factory));
        self
    }

    /// Timer scheduler used for refills.
    #[must_use]
    pub fn timer_scheduler(mut self, timers: impl TimerScheduler + 'static) -> Self {
        self.timers = Some(Arc::new(timers));
        self
    }

    /// Use an existing dispatch queue instead of a fresh one.
    #[must_use]
    pub fn queue(mut self, queue: Arc<SharedDispatchQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Host the queue driver on `spawner` once the scheduler is built.
    #[must_use]
    pub fn spawn_driver_with<S>(mut self, spawner: S) -> Self
    where
        S: Spawn + Send + 'static,
    {
        self.driver = Some(Box::new(move |queue: &Arc<SharedDispatchQueue>| {
            queue.spawn_driver(&spawner);
        }));
        self
    }

    /// Validate and assemble the scheduler.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::InvalidConfig` when the configuration fails validation
    /// - `SchedulerError::MissingComponent` when a factory or timer is absent
    /// - `SchedulerError::Backend` when the default timer needs a runtime and none is running
    pub fn build(self) -> Result<SchedulerCore, SchedulerError> {
        self.config.validate().map_err(SchedulerError::InvalidConfig)?;
        let core_factory = self
            .core_factory
            .ok_or(SchedulerError::MissingComponent("core feed factory"))?;
        let special_factory = self
            .special_factory
            .ok_or(SchedulerError::MissingComponent("special feed factory"))?;
        let timers = match self.timers {
            Some(timers) => timers,
            None => default_timers()?,
        };
        let queue = self
            .queue
            .unwrap_or_else(|| Arc::new(SharedDispatchQueue::new()));
        if let Some(driver) = self.driver {
            driver(&queue);
        }

        Ok(SchedulerCore::new(
            self.config.refill_period(),
            core_factory,
            special_factory,
            timers,
            queue,
        ))
    }
}

#[cfg(feature = "tokio-runtime")]
fn default_timers() -> Result<Arc<dyn TimerScheduler>, SchedulerError> {
    Ok(Arc::new(crate::runtime::TokioTimerScheduler::current()?))
}

#[cfg(not(feature = "tokio-runtime"))]
fn default_timers() -> Result<Arc<dyn TimerScheduler>, SchedulerError> {
    Err(SchedulerError::MissingComponent("timer scheduler"))
}
