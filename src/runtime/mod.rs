//! Runtime adapters: queue driver spawners and refill timers.

pub mod manual_timer;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_spawner;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_timer;

pub use manual_timer::ManualTimerScheduler;
#[cfg(feature = "tokio-runtime")]
pub use tokio_spawner::TokioSpawner;
#[cfg(feature = "tokio-runtime")]
pub use tokio_timer::TokioTimerScheduler;
