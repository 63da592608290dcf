//! Feed capability and feed identities.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::operation::CancelToken;
use super::scheduler::SpecialFeedDisabler;

/// Opaque, stable identity of a special feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedId(String);

impl FeedId {
    /// Create a feed id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeedId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FeedId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identity of the user the core feed is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a user id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Key used to tag poll operations in the dispatch queue.
///
/// The core feed is a singleton and is not addressable by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedKey {
    /// The core feed.
    Core,
    /// A special feed scoped to one sub-resource.
    Special(FeedId),
}

impl FeedKey {
    /// Returns the special feed id, if any.
    #[must_use]
    pub const fn feed_id(&self) -> Option<&FeedId> {
        match self {
            Self::Core => None,
            Self::Special(id) => Some(id),
        }
    }
}

impl fmt::Display for FeedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core => f.write_str("core"),
            Self::Special(id) => write!(f, "special:{id}"),
        }
    }
}

/// A pollable source of incremental remote updates.
///
/// `poll_once` fetches and applies one batch. Failures are the feed's own
/// business: the scheduler neither observes nor retries them. A long poll
/// should check `cancel` between steps and return early once it fires.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use prometheus_feed_scheduler::core::{CancelToken, Feed};
///
/// struct CalendarFeed;
///
/// #[async_trait]
/// impl Feed for CalendarFeed {
///     async fn poll_once(&self, cancel: CancelToken) {
///         if cancel.is_cancelled() {
///             return;
///         }
///         // fetch + apply
///     }
/// }
/// ```
#[async_trait]
pub trait Feed: Send + Sync + 'static {
    /// Fetch and apply one batch.
    async fn poll_once(&self, cancel: CancelToken);
}

/// Builds the core feed for a user. The disabler is the core feed's
/// authority to switch off special feeds.
pub type CoreFeedFactory = Arc<dyn Fn(&UserId, SpecialFeedDisabler) -> Arc<dyn Feed> + Send + Sync>;

/// Builds a special feed for a feed id.
pub type SpecialFeedFactory = Arc<dyn Fn(&FeedId) -> Arc<dyn Feed> + Send + Sync>;
