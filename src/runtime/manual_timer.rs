//! Deterministic timer scheduler for tests and hosts that drive refills themselves.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::{TickFn, TimerHandle, TimerScheduler};

struct ManualTimer {
    period: Duration,
    valid: Arc<AtomicBool>,
    tick: TickFn,
}

struct ManualTimerHandle {
    valid: Arc<AtomicBool>,
}

impl TimerHandle for ManualTimerHandle {
    fn invalidate(&self) {
        self.valid.store(false, Ordering::Release);
    }

    fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }
}

/// Timer scheduler that never fires on its own.
///
/// Installed timers are recorded; [`simulate_tick`](Self::simulate_tick)
/// fires every timer that is still valid. Clones share the same record.
#[derive(Clone, Default)]
pub struct ManualTimerScheduler {
    timers: Arc<Mutex<Vec<ManualTimer>>>,
}

impl ManualTimerScheduler {
    /// Create a scheduler with no timers installed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every valid timer once. Returns how many fired.
    pub fn simulate_tick(&self) -> usize {
        let ticks: Vec<TickFn> = self
            .timers
            .lock()
            .iter()
            .filter(|t| t.valid.load(Ordering::Acquire))
            .map(|t| Arc::clone(&t.tick))
            .collect();
        for tick in &ticks {
            tick();
        }
        ticks.len()
    }

    /// How many timers were ever installed.
    #[must_use]
    pub fn schedule_count(&self) -> usize {
        self.timers.lock().len()
    }

    /// How many installed timers are still valid.
    #[must_use]
    pub fn valid_count(&self) -> usize {
        self.timers
            .lock()
            .iter()
            .filter(|t| t.valid.load(Ordering::Acquire))
            .count()
    }

    /// Period of the most recently installed timer.
    #[must_use]
    pub fn last_period(&self) -> Option<Duration> {
        self.timers.lock().last().map(|t| t.period)
    }

    /// Whether the most recently installed timer is still valid.
    #[must_use]
    pub fn last_is_valid(&self) -> Option<bool> {
        self.timers
            .lock()
            .last()
            .map(|t| t.valid.load(Ordering::Acquire))
    }
}

impl TimerScheduler for ManualTimerScheduler {
    fn schedule_repeating(&self, period: Duration, tick: TickFn) -> Box<dyn TimerHandle> {
        let valid = Arc::new(AtomicBool::new(true));
        self.timers.lock().push(ManualTimer {
            period,
            valid: Arc::clone(&valid),
            tick,
        });
        Box::new(ManualTimerHandle { valid })
    }
}
