//! Repeating-timer abstraction used for periodic refills.

use std::sync::Arc;
use std::time::Duration;

/// Callback invoked on every timer fire.
pub type TickFn = Arc<dyn Fn() + Send + Sync>;

/// Handle to an installed repeating timer.
pub trait TimerHandle: Send + Sync {
    /// Stop the timer. Idempotent.
    fn invalidate(&self);
    /// Whether the timer is still installed.
    fn is_valid(&self) -> bool;
}

/// Installs repeating timers.
///
/// Implementations fire `tick` every `period`. Production timers fire once
/// right away on installation; test doubles may leave firing to the test.
pub trait TimerScheduler: Send + Sync {
    /// Install a repeating timer.
    fn schedule_repeating(&self, period: Duration, tick: TickFn) -> Box<dyn TimerHandle>;
}
