pub mod browser;
pub mod cancel;
pub mod config;
pub mod crawl;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod storage;
pub mod utils;

pub use browser::BrowserManager;
pub use cancel::{CancelHandle, CancelToken};
pub use config::{JobConfig, JobConfigBuilder, LinkFilter, LlmConfig, LlmProvider, Settings};
pub use crawl::{
    CrawlOutcome, Crawler, Frontier, FrontierEntry, JsonStateStore, MemoryStateStore, PageFetcher,
    RenderedPage, RobotsPolicy, StateStore, UrlStatus,
};
pub use enrich::llm::{CompletionRequest, LlmClient};
pub use enrich::schema::{
    CrawlMetadata, EnrichedPage, EnrichedSection, SectionType, SynthesizedResult,
};
pub use enrich::{Enricher, build_client};
pub use error::{Result, ScrapeError};
pub use extract::{DiscoveredLink, DomParser, PageExtract, ParsedPage, Section, SectionDetector};
pub use orchestrator::{JobResult, JobRunner, JobStatus};
pub use storage::FileManager;

/// Run one job with default settings and no enrichment backend.
pub async fn run(config: &JobConfig) -> JobResult {
    JobRunner::new(Settings::default()).run(config).await
}
