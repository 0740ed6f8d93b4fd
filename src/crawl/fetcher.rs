//! The page acquisition seam between the crawler and the browser.
//!
//! Production uses [`BrowserManager`](crate::browser::BrowserManager); tests
//! substitute a stub serving canned HTML. The crawler only ever sees this
//! trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use url::Url;

use crate::error::Result;

/// A page after navigation and hydration, ready for extraction.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub url: Url,
    /// Final DOM serialization, post-hydration and post-expansion.
    pub html: String,
    pub fetched_at: DateTime<Utc>,
    /// HTTP status of the navigation, when the browser could observe it.
    pub status: Option<u16>,
}

/// Issues rendered pages on demand.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Navigate to `url`, wait for the DOM to settle, expand interactive
    /// regions, and return the final HTML.
    ///
    /// Timeouts and navigation errors surface as
    /// [`ScrapeError::Navigation`](crate::error::ScrapeError::Navigation);
    /// an explicit block status surfaces as
    /// [`ScrapeError::Blocked`](crate::error::ScrapeError::Blocked).
    async fn fetch(&self, url: &Url) -> Result<RenderedPage>;
}
