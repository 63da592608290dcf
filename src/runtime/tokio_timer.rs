//! Repeating refill timer backed by `tokio::time::interval`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::core::{SchedulerError, TickFn, TimerHandle, TimerScheduler};

/// Timer scheduler that runs each timer as a task on a tokio runtime.
///
/// The first tick fires immediately, then every `period`. Missed ticks are
/// delayed rather than bursted.
#[derive(Clone)]
pub struct TokioTimerScheduler {
    handle: tokio::runtime::Handle,
}

impl TokioTimerScheduler {
    /// Create a timer scheduler on the given runtime.
    #[must_use]
    pub const fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Use the runtime the caller is currently inside.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Backend` when called outside a tokio runtime.
    pub fn current() -> Result<Self, SchedulerError> {
        tokio::runtime::Handle::try_current()
            .map(Self::new)
            .map_err(|e| SchedulerError::Backend(format!("no tokio runtime: {e}")))
    }
}

struct TokioTimerHandle {
    valid: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl TimerHandle for TokioTimerHandle {
    fn invalidate(&self) {
        self.valid.store(false, Ordering::Release);
        self.task.abort();
    }

    fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }
}

impl Drop for TokioTimerHandle {
    fn drop(&mut self) {
        self.invalidate();
    }
}

impl TimerScheduler for TokioTimerScheduler {
    fn schedule_repeating(&self, period: Duration, tick: TickFn) -> Box<dyn TimerHandle> {
        let valid = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&valid);
        let task = self.handle.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !flag.load(Ordering::Acquire) {
                    break;
                }
                tick();
            }
        });
        Box::new(TokioTimerHandle { valid, task })
    }
}
