//! Validating builder for [`JobConfig`].

use url::Url;

use super::types::{JobConfig, LinkFilter};
use crate::error::{Result, ScrapeError};
use crate::utils::constants::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_PAGES};

/// Fluent builder; `build()` rejects configurations the pipeline cannot run.
#[derive(Debug, Clone)]
pub struct JobConfigBuilder {
    seed: Option<String>,
    job_name: Option<String>,
    max_depth: u8,
    max_pages: usize,
    link_filter: LinkFilter,
    save_individual_pages: bool,
    final_synthesis: bool,
    skip_enrichment: bool,
}

impl Default for JobConfigBuilder {
    fn default() -> Self {
        Self {
            seed: None,
            job_name: None,
            max_depth: DEFAULT_MAX_DEPTH,
            max_pages: DEFAULT_MAX_PAGES,
            link_filter: LinkFilter::SamePath,
            save_individual_pages: true,
            final_synthesis: false,
            skip_enrichment: false,
        }
    }
}

impl JobConfigBuilder {
    #[must_use]
    pub fn seed_url(mut self, url: impl Into<String>) -> Self {
        self.seed = Some(url.into());
        self
    }

    #[must_use]
    pub fn job_name(mut self, name: impl Into<String>) -> Self {
        self.job_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn max_depth(mut self, depth: u8) -> Self {
        self.max_depth = depth;
        self
    }

    #[must_use]
    pub fn max_pages(mut self, pages: usize) -> Self {
        self.max_pages = pages;
        self
    }

    #[must_use]
    pub fn link_filter(mut self, filter: LinkFilter) -> Self {
        self.link_filter = filter;
        self
    }

    #[must_use]
    pub fn save_individual_pages(mut self, save: bool) -> Self {
        self.save_individual_pages = save;
        self
    }

    #[must_use]
    pub fn final_synthesis(mut self, synthesize: bool) -> Self {
        self.final_synthesis = synthesize;
        self
    }

    #[must_use]
    pub fn skip_enrichment(mut self, skip: bool) -> Self {
        self.skip_enrichment = skip;
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> Result<JobConfig> {
        let seed_str = self
            .seed
            .ok_or_else(|| ScrapeError::Config("seed URL is required".into()))?;
        let seed = Url::parse(&seed_str)
            .map_err(|e| ScrapeError::Config(format!("invalid seed URL '{seed_str}': {e}")))?;
        if !matches!(seed.scheme(), "http" | "https") {
            return Err(ScrapeError::Config(format!(
                "seed URL must be http(s), got '{}'",
                seed.scheme()
            )));
        }
        if seed.host_str().is_none() {
            return Err(ScrapeError::Config(format!("seed URL '{seed_str}' has no host")));
        }

        let job_name = self
            .job_name
            .ok_or_else(|| ScrapeError::Config("job name is required".into()))?;
        let job_name = job_name.trim().to_string();
        if job_name.is_empty() {
            return Err(ScrapeError::Config("job name must not be empty".into()));
        }
        // The job name becomes a directory component; keep it safe.
        let sanitized = sanitize_filename::sanitize(&job_name);
        if sanitized != job_name {
            return Err(ScrapeError::Config(format!(
                "job name '{job_name}' contains filesystem-unsafe characters"
            )));
        }

        if self.max_pages == 0 {
            return Err(ScrapeError::Config("max_pages must be at least 1".into()));
        }

        Ok(JobConfig {
            seed,
            job_name,
            max_depth: self.max_depth,
            max_pages: self.max_pages,
            link_filter: self.link_filter,
            save_individual_pages: self.save_individual_pages,
            final_synthesis: self.final_synthesis,
            skip_enrichment: self.skip_enrichment,
        })
    }
}
