//! Feed adapters built on top of the scheduler's `Feed` capability.

pub mod paged;

pub use paged::{EventPage, EventsLoop, PagedFeed};
