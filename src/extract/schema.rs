//! Extraction records: the ground-truth shapes written to `parsed_pages/`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// One heading-delimited region of page text.
///
/// `title` is the heading text verbatim; `content` is whitespace-collapsed
/// but otherwise unmodified. Downstream stages annotate, never rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
}

/// A link found inside extracted content, eligible for the frontier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    pub url: Url,
    pub text: String,
}

/// Everything the parser produces for one rendered page.
#[derive(Debug, Clone)]
pub struct PageExtract {
    /// Best-effort page title: first `<h1>`, else `<title>`, else "Untitled".
    pub title: String,
    /// Sections in DOM order.
    pub sections: Vec<Section>,
    /// Content-referenced outbound links in document order, deduplicated.
    pub links: Vec<DiscoveredLink>,
}

/// The parsed page record persisted as ground truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedPage {
    pub url: String,
    pub depth: u8,
    pub title: String,
    pub sections: Vec<Section>,
    pub outbound_links: Vec<String>,
    pub scraped_at: DateTime<Utc>,
}
