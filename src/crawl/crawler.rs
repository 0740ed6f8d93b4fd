//! Bounded breadth-first crawl.
//!
//! Pages are visited in strict FIFO order: depth-0 pages are fully processed
//! before depth-1 begins, which bounds the blast radius when `max_pages`
//! truncates the job mid-breadth. A failed page never aborts the job; state
//! persistence failure and a block signal always do.

use tracing::{debug, info, warn};

use super::fetcher::{PageFetcher, RenderedPage};
use super::frontier::{Frontier, FrontierEntry};
use super::robots::RobotsPolicy;
use super::state::{StateStore, UrlStatus};
use crate::cancel::CancelToken;
use crate::config::{JobConfig, Settings};
use crate::error::{Result, ScrapeError};
use crate::extract::dom_parser::DomParser;
use crate::extract::schema::ParsedPage;
use crate::storage::FileManager;
use crate::utils::delays::random_delay;
use crate::utils::url_utils::url_slug;

/// What a finished crawl hands to the enrichment stage.
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    /// Parsed pages in visit (BFS) order.
    pub pages: Vec<ParsedPage>,
    /// URLs that failed twice during this run.
    pub failed_urls: Vec<String>,
}

/// One job's crawl loop. Exclusively owns the frontier and the state store
/// while running.
pub struct Crawler<'a> {
    config: &'a JobConfig,
    settings: &'a Settings,
    fetcher: &'a dyn PageFetcher,
    state: &'a mut dyn StateStore,
    files: &'a FileManager,
    robots: &'a RobotsPolicy,
    cancel: CancelToken,
}

impl<'a> Crawler<'a> {
    pub fn new(
        config: &'a JobConfig,
        settings: &'a Settings,
        fetcher: &'a dyn PageFetcher,
        state: &'a mut dyn StateStore,
        files: &'a FileManager,
        robots: &'a RobotsPolicy,
        cancel: CancelToken,
    ) -> Self {
        Self {
            config,
            settings,
            fetcher,
            state,
            files,
            robots,
            cancel,
        }
    }

    /// Run the bounded BFS to completion, cancellation, or a fatal error.
    pub async fn crawl(&mut self) -> Result<CrawlOutcome> {
        let mut frontier = Frontier::new();
        let mut outcome = CrawlOutcome::default();

        let seed = FrontierEntry::new(self.config.seed().clone(), 0);
        if self.state.status(&seed.key).is_none() {
            self.state.mark(&seed.key, UrlStatus::Pending)?;
        }
        frontier.push(seed);

        loop {
            if outcome.pages.len() >= self.config.max_pages() {
                info!(max_pages = self.config.max_pages(), "page budget reached");
                break;
            }
            let Some(entry) = frontier.pop() else {
                break;
            };

            match self.state.status(&entry.key) {
                Some(UrlStatus::Visited) | Some(UrlStatus::Failed) => {
                    debug!(url = %entry.url, "already processed in a previous run, skipping");
                    continue;
                }
                _ => {}
            }

            if self.cancel.is_cancelled() {
                return Err(ScrapeError::Cancelled);
            }

            // One delay per page, regardless of how many fetch attempts follow.
            tokio::select! {
                _ = self.cancel.cancelled() => return Err(ScrapeError::Cancelled),
                _ = random_delay(self.settings.min_delay_secs, self.settings.max_delay_secs) => {}
            }

            info!(url = %entry.url, depth = entry.depth, "crawling");

            let rendered = match self.fetch_with_retry(&entry).await {
                Ok(rendered) => rendered,
                Err(
                    fatal @ (ScrapeError::Blocked(_)
                    | ScrapeError::Cancelled
                    | ScrapeError::State(_)
                    | ScrapeError::Storage(_)),
                ) => return Err(fatal),
                Err(e) => {
                    warn!(url = %entry.url, error = %e, "page failed after retry, recording");
                    self.state.mark(&entry.key, UrlStatus::Failed)?;
                    outcome.failed_urls.push(entry.url.to_string());
                    continue;
                }
            };

            let parsed = self.process_page(&entry, &rendered).await?;
            self.state.mark(&entry.key, UrlStatus::Visited)?;

            self.enqueue_links(&mut frontier, &entry, &parsed)?;
            outcome.pages.push(parsed);
        }

        info!(
            pages = outcome.pages.len(),
            failed = outcome.failed_urls.len(),
            "crawl finished"
        );
        Ok(outcome)
    }

    /// Fetch with the one-retry policy. Fatal error classes bypass the retry.
    async fn fetch_with_retry(&self, entry: &FrontierEntry) -> Result<RenderedPage> {
        let first = tokio::select! {
            _ = self.cancel.cancelled() => return Err(ScrapeError::Cancelled),
            result = self.fetcher.fetch(&entry.url) => result,
        };

        let first_err = match first {
            Ok(rendered) => return Ok(rendered),
            Err(
                fatal @ (ScrapeError::Blocked(_)
                | ScrapeError::Cancelled
                | ScrapeError::State(_)
                | ScrapeError::Storage(_)),
            ) => return Err(fatal),
            Err(e) => e,
        };

        warn!(url = %entry.url, error = %first_err, "fetch failed, retrying once");
        tokio::select! {
            _ = self.cancel.cancelled() => Err(ScrapeError::Cancelled),
            result = self.fetcher.fetch(&entry.url) => result,
        }
    }

    /// Extract and persist one page. Raw and parsed artifacts land on disk
    /// before the next fetch starts.
    async fn process_page(
        &self,
        entry: &FrontierEntry,
        rendered: &RenderedPage,
    ) -> Result<ParsedPage> {
        let parser = DomParser::new(entry.url.clone());
        let extract = parser.parse(&rendered.html);

        if extract.sections.is_empty() {
            info!(url = %entry.url, "zero sections after junk removal, saving as-is");
        }

        let parsed = ParsedPage {
            url: entry.url.to_string(),
            depth: entry.depth,
            title: extract.title,
            sections: extract.sections,
            outbound_links: extract.links.iter().map(|l| l.url.to_string()).collect(),
            scraped_at: rendered.fetched_at,
        };

        let slug = url_slug(&entry.url);
        self.files.save_raw_html(&slug, &rendered.html).await?;
        self.files.save_parsed(&slug, &parsed).await?;

        debug!(
            url = %entry.url,
            sections = parsed.sections.len(),
            links = parsed.outbound_links.len(),
            "page persisted"
        );
        Ok(parsed)
    }

    /// Admit surviving outbound links to the frontier at `depth + 1`.
    fn enqueue_links(
        &mut self,
        frontier: &mut Frontier,
        entry: &FrontierEntry,
        parsed: &ParsedPage,
    ) -> Result<()> {
        if entry.depth >= self.config.max_depth() {
            return Ok(());
        }
        let next_depth = entry.depth + 1;

        for link in &parsed.outbound_links {
            let Ok(url) = url::Url::parse(link) else {
                continue;
            };
            if !self.config.link_filter().allows(self.config.seed(), &url) {
                continue;
            }
            if !self.robots.allows(&url) {
                debug!(url = %url, "robots.txt disallows discovered link, dropping");
                continue;
            }

            let candidate = FrontierEntry::new(url, next_depth);
            if frontier.knows(&candidate.key) {
                continue;
            }
            match self.state.status(&candidate.key) {
                Some(UrlStatus::Visited) | Some(UrlStatus::Failed) => continue,
                Some(UrlStatus::Pending) => {
                    frontier.push(candidate);
                }
                None => {
                    self.state.mark(&candidate.key, UrlStatus::Pending)?;
                    frontier.push(candidate);
                }
            }
        }
        Ok(())
    }
}
