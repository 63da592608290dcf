//! Error types for scheduler construction and feed loops.

use thiserror::Error;

/// Errors produced while assembling scheduler components.
///
/// A running scheduler never fails: unknown feed ids are silent no-ops and
/// feed failures stay inside the feed. These variants only surface from
/// configuration and builders.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A required component (factory, timer) was not supplied to the builder.
    #[error("missing component: {0}")]
    MissingComponent(&'static str),
    /// Runtime or backend failure with context.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Failures reported by a paged events loop.
///
/// These never reach the scheduler; `PagedFeed` hands them to
/// `EventsLoop::on_error` and the feed simply waits for its next poll.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedLoopError {
    /// No cursor is stored yet, so there is nothing to poll from.
    #[error("latest event id is missing")]
    MissingLatestEventId,
    /// The remote side asked for the local cache to be rebuilt.
    #[error("local cache is outdated")]
    CacheOutdated,
    /// Fetching a page failed.
    #[error("network error: {0}")]
    Network(String),
    /// Applying a fetched page failed.
    #[error("page processing error: {0}")]
    PageProcessing(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
