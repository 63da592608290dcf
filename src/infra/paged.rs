//! Paged events-loop adapter.
//!
//! Many feeds share one shape: fetch the page after a stored cursor, apply
//! it, commit the new cursor, and keep going while the server reports more
//! pages. [`PagedFeed`] implements that shape as a [`Feed`] on top of an
//! [`EventsLoop`], which supplies transport, processing and cursor storage.
//!
//! The cursor only advances after a page is processed successfully, so a
//! failed poll is retried from the same point on the next refill.

use async_trait::async_trait;

use crate::core::{AppResult, CancelToken, Feed, FeedLoopError};

/// One page of remote events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPage<P> {
    /// Cursor to store once this page is applied.
    pub event_id: String,
    /// More pages follow this one.
    pub has_more_pages: bool,
    /// The server wants the local cache rebuilt; the page must not be applied.
    pub requires_clear_cache: bool,
    /// Loop-specific content.
    pub payload: P,
}

/// A remote incremental log consumed page by page.
#[async_trait]
pub trait EventsLoop: Send + Sync + 'static {
    /// Page content type.
    type Payload: Send + Sync + 'static;

    /// Identifier used in logs.
    fn loop_id(&self) -> String;

    /// Stored cursor, if any.
    fn latest_event_id(&self) -> Option<String>;

    /// Persist a new cursor.
    fn set_latest_event_id(&self, event_id: String);

    /// Fetch the page after `since`.
    async fn poll(&self, since: &str) -> AppResult<EventPage<Self::Payload>>;

    /// Apply a fetched page.
    async fn process(&self, page: &EventPage<Self::Payload>) -> AppResult<()>;

    /// Receives the failure that ended a poll.
    fn on_error(&self, error: FeedLoopError);
}

/// [`Feed`] implementation draining an [`EventsLoop`].
pub struct PagedFeed<L> {
    events: L,
}

impl<L: EventsLoop> PagedFeed<L> {
    /// Wrap an events loop.
    pub const fn new(events: L) -> Self {
        Self { events }
    }

    /// The wrapped events loop.
    pub const fn events_loop(&self) -> &L {
        &self.events
    }

    async fn drain(&self, cancel: &CancelToken) -> Result<(), FeedLoopError> {
        let mut since = self
            .events
            .latest_event_id()
            .ok_or(FeedLoopError::MissingLatestEventId)?;

        loop {
            if cancel.is_cancelled() {
                tracing::debug!(loop_id = %self.events.loop_id(), "events loop cancelled");
                return Ok(());
            }

            let page = self
                .events
                .poll(&since)
                .await
                .map_err(|e| FeedLoopError::Network(e.to_string()))?;
            if page.requires_clear_cache {
                return Err(FeedLoopError::CacheOutdated);
            }
            self.events
                .process(&page)
                .await
                .map_err(|e| FeedLoopError::PageProcessing(e.to_string()))?;

            since = page.event_id;
            self.events.set_latest_event_id(since.clone());

            if !page.has_more_pages {
                return Ok(());
            }
        }
    }
}

#[async_trait]
impl<L: EventsLoop> Feed for PagedFeed<L> {
    async fn poll_once(&self, cancel: CancelToken) {
        if let Err(error) = self.drain(&cancel).await {
            tracing::debug!(loop_id = %self.events.loop_id(), %error, "events loop stopped");
            self.events.on_error(error);
        }
    }
}
