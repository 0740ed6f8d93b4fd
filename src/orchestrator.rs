//! Job orchestration: robots gate → crawl → enrich → synthesis.
//!
//! Owns the `JobConfig` and `JobResult` for the job's lifetime, creates the
//! job-scoped browser session and state store, and folds every outcome into
//! exactly one of `completed | failed | cancelled`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use url::Url;

use crate::browser::BrowserManager;
use crate::cancel::CancelToken;
use crate::config::{JobConfig, Settings};
use crate::crawl::{CrawlOutcome, Crawler, JsonStateStore, RobotsPolicy, StateStore};
use crate::enrich::llm::LlmClient;
use crate::enrich::schema::{CrawlMetadata, EnrichedPage, SynthesizedResult};
use crate::enrich::Enricher;
use crate::error::{Result, ScrapeError};
use crate::storage::FileManager;
use crate::utils::url_utils::url_slug;

/// Caller-visible terminal state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Completed,
    Failed,
    Cancelled,
}

/// The one structured value handed back across the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub status: JobStatus,
    pub pages_scraped: usize,
    pub duration_secs: f64,
    pub output_dir: PathBuf,
    pub failed_urls: Vec<String>,
    pub error: Option<String>,
    pub synthesized: Option<SynthesizedResult>,
}

struct JobArtifacts {
    pages_scraped: usize,
    failed_urls: Vec<String>,
    synthesized: Option<SynthesizedResult>,
}

/// Runs jobs against fixed settings and an optional LLM backend.
pub struct JobRunner {
    settings: Settings,
    llm: Option<Arc<dyn LlmClient>>,
    http: reqwest::Client,
}

impl JobRunner {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            llm: None,
            http: reqwest::Client::new(),
        }
    }

    /// Attach the enrichment backend. Without one, enrichment and synthesis
    /// are skipped and the job still completes on ground truth alone.
    #[must_use]
    pub fn with_llm(mut self, client: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(client);
        self
    }

    /// Run a job to completion without external cancellation.
    pub async fn run(&self, config: &JobConfig) -> JobResult {
        self.run_with_cancel(config, CancelToken::never()).await
    }

    /// Run a job, aborting at the next suspension point if `cancel` fires.
    pub async fn run_with_cancel(&self, config: &JobConfig, cancel: CancelToken) -> JobResult {
        let started = Instant::now();
        let output_dir = self.settings.data_dir.join(config.job_name());

        info!(
            job = config.job_name(),
            seed = %config.seed(),
            max_depth = config.max_depth(),
            max_pages = config.max_pages(),
            "starting job"
        );

        match self.execute(config, &cancel, started).await {
            Ok(artifacts) => {
                let duration_secs = started.elapsed().as_secs_f64();
                info!(
                    job = config.job_name(),
                    pages = artifacts.pages_scraped,
                    duration_secs,
                    "job completed"
                );
                JobResult {
                    status: JobStatus::Completed,
                    pages_scraped: artifacts.pages_scraped,
                    duration_secs,
                    output_dir,
                    failed_urls: artifacts.failed_urls,
                    error: None,
                    synthesized: artifacts.synthesized,
                }
            }
            Err(ScrapeError::Cancelled) => {
                warn!(job = config.job_name(), "job cancelled");
                JobResult {
                    status: JobStatus::Cancelled,
                    pages_scraped: 0,
                    duration_secs: started.elapsed().as_secs_f64(),
                    output_dir,
                    failed_urls: Vec::new(),
                    error: None,
                    synthesized: None,
                }
            }
            Err(e) => {
                error!(job = config.job_name(), error = %e, "job failed");
                JobResult {
                    status: JobStatus::Failed,
                    pages_scraped: 0,
                    duration_secs: started.elapsed().as_secs_f64(),
                    output_dir,
                    failed_urls: Vec::new(),
                    error: Some(e.to_string()),
                    synthesized: None,
                }
            }
        }
    }

    async fn execute(
        &self,
        config: &JobConfig,
        cancel: &CancelToken,
        started: Instant,
    ) -> Result<JobArtifacts> {
        let files = FileManager::create(&self.settings.data_dir, config.job_name())?;

        // Robots gate: a disallowed seed aborts before anything is fetched.
        let robots = RobotsPolicy::fetch(&self.http, config.seed()).await;
        robots.check_seed(config.seed())?;

        let mut state = JsonStateStore::load(&files.state_dir())?;
        let browser = BrowserManager::launch(&self.settings).await?;

        let outcome = {
            let mut crawler = Crawler::new(
                config,
                &self.settings,
                &browser,
                &mut state as &mut dyn StateStore,
                &files,
                &robots,
                cancel.clone(),
            );
            crawler.crawl().await
        };
        browser.close().await;
        let outcome = outcome?;

        let synthesized = self
            .enrich_and_synthesize(config, cancel, started, &files, &outcome)
            .await?;

        Ok(JobArtifacts {
            pages_scraped: outcome.pages.len(),
            failed_urls: outcome.failed_urls,
            synthesized,
        })
    }

    async fn enrich_and_synthesize(
        &self,
        config: &JobConfig,
        cancel: &CancelToken,
        started: Instant,
        files: &FileManager,
        outcome: &CrawlOutcome,
    ) -> Result<Option<SynthesizedResult>> {
        if config.skip_enrichment() || outcome.pages.is_empty() {
            return Ok(None);
        }
        let Some(llm) = &self.llm else {
            warn!("no LLM backend configured, skipping enrichment");
            return Ok(None);
        };

        let enricher = Enricher::new(Arc::clone(llm));
        let mut enriched: Vec<EnrichedPage> = Vec::with_capacity(outcome.pages.len());

        // Same order the crawler produced them; each page's artifact lands
        // before the next page is classified.
        for page in &outcome.pages {
            let enriched_page = tokio::select! {
                _ = cancel.cancelled() => return Err(ScrapeError::Cancelled),
                enriched_page = enricher.enrich_page(page) => enriched_page,
            };
            if config.save_individual_pages()
                && let Ok(url) = Url::parse(&page.url)
            {
                files.save_enriched(&url_slug(&url), &enriched_page).await?;
            }
            enriched.push(enriched_page);
        }

        if !config.final_synthesis() {
            return Ok(None);
        }

        let metadata = CrawlMetadata {
            total_pages: outcome.pages.len(),
            duration_seconds: started.elapsed().as_secs_f64(),
            visited_urls: outcome.pages.iter().map(|p| p.url.clone()).collect(),
            failed_urls: outcome.failed_urls.clone(),
        };

        let synthesized = tokio::select! {
            _ = cancel.cancelled() => return Err(ScrapeError::Cancelled),
            result = enricher.synthesize(config, &enriched, metadata) => result?,
        };
        files.save_final(&synthesized).await?;

        Ok(Some(synthesized))
    }
}
