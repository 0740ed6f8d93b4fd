//! Error taxonomy for the extraction pipeline.
//!
//! Per-page failures (navigation, enrichment) are recovered where they occur
//! and never abort a job; infrastructure failures (state persistence, browser
//! launch, a block signal from the target) propagate and terminate the job.

use thiserror::Error;

/// Errors surfaced by the crawl/parse/enrich pipeline.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Invalid job configuration (bad seed URL, empty name, zero page budget).
    #[error("configuration error: {0}")]
    Config(String),

    /// The browser process could not be launched. Fatal to the job.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// A page failed to navigate or hydrate within its timeout.
    /// Retried once by the crawler; a second failure marks the URL failed.
    #[error("navigation failed for {url}: {reason}")]
    Navigation { url: String, reason: String },

    /// The target site refused us (robots.txt disallow or an explicit
    /// block status). Fatal to the job, no workarounds are attempted.
    #[error("blocked by target site: {0}")]
    Blocked(String),

    /// Crawl state could not be persisted. Fatal: continuing would silently
    /// void the resumability guarantee.
    #[error("crawl state persistence failed: {0}")]
    State(String),

    /// An output artifact could not be written. Fatal to the job.
    #[error("storage error: {0}")]
    Storage(String),

    /// An LLM request failed at the transport or parse layer. The enricher
    /// resolves these locally; they only escape during synthesis.
    #[error("llm request failed: {0}")]
    Llm(String),

    /// The job-level cancellation signal fired.
    #[error("job cancelled")]
    Cancelled,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ScrapeError>;
