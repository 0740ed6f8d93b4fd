//! Job, runtime, and LLM configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::utils::constants::{
    DEFAULT_MAX_DELAY_SECS, DEFAULT_MIN_DELAY_SECS, DEFAULT_NAVIGATION_TIMEOUT_SECS,
    DEFAULT_PAGE_LOAD_TIMEOUT_SECS, DEFAULT_SETTLE_MILLIS,
};

/// Which discovered links are eligible for the crawl frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkFilter {
    /// Same host, and the link path must share the seed's path prefix
    /// (the seed path with its final segment dropped).
    SamePath,
    /// Same host, any path.
    SameDomain,
    /// No restriction beyond being a fetchable http(s) URL.
    All,
}

impl LinkFilter {
    /// Decide whether a candidate URL may enter the frontier.
    #[must_use]
    pub fn allows(&self, seed: &Url, candidate: &Url) -> bool {
        match self {
            Self::All => true,
            Self::SameDomain => candidate.host_str() == seed.host_str(),
            Self::SamePath => {
                if candidate.host_str() != seed.host_str() {
                    return false;
                }
                let seed_path = seed.path().trim_end_matches('/');
                let prefix = match seed_path.rfind('/') {
                    Some(idx) => &seed_path[..idx],
                    None => "",
                };
                let candidate_path = candidate.path().trim_end_matches('/');
                // Prefix match on segment boundaries, so /guide never
                // admits /guidebook.
                candidate_path == seed_path
                    || candidate_path == prefix
                    || candidate_path.starts_with(&format!("{prefix}/"))
            }
        }
    }
}

/// Immutable description of one scrape job.
///
/// Built through [`JobConfigBuilder`](super::builder::JobConfigBuilder);
/// never mutated after the job starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub(crate) seed: Url,
    pub(crate) job_name: String,
    pub(crate) max_depth: u8,
    pub(crate) max_pages: usize,
    pub(crate) link_filter: LinkFilter,
    pub(crate) save_individual_pages: bool,
    pub(crate) final_synthesis: bool,
    pub(crate) skip_enrichment: bool,
}

impl JobConfig {
    #[must_use]
    pub fn builder() -> super::builder::JobConfigBuilder {
        super::builder::JobConfigBuilder::default()
    }

    #[must_use]
    pub fn seed(&self) -> &Url {
        &self.seed
    }

    #[must_use]
    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    #[must_use]
    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    #[must_use]
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    #[must_use]
    pub fn link_filter(&self) -> LinkFilter {
        self.link_filter
    }

    #[must_use]
    pub fn save_individual_pages(&self) -> bool {
        self.save_individual_pages
    }

    #[must_use]
    pub fn final_synthesis(&self) -> bool {
        self.final_synthesis
    }

    #[must_use]
    pub fn skip_enrichment(&self) -> bool {
        self.skip_enrichment
    }
}

/// Runtime settings shared across jobs: storage root, delay window, browser
/// timeouts. Supplied by the embedding layer; this crate never reads the
/// environment itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Root directory under which each job gets its own subtree.
    pub data_dir: PathBuf,
    /// Anti-blocking delay window, in seconds.
    pub min_delay_secs: f64,
    pub max_delay_secs: f64,
    /// Timeout for `page.goto`, in seconds.
    pub page_load_timeout_secs: u64,
    /// Timeout for waiting on page load events, in seconds.
    pub navigation_timeout_secs: u64,
    /// Extra settle time after navigation for JS hydration, in milliseconds.
    pub settle_millis: u64,
    /// Run the browser headless.
    pub headless: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            min_delay_secs: DEFAULT_MIN_DELAY_SECS,
            max_delay_secs: DEFAULT_MAX_DELAY_SECS,
            page_load_timeout_secs: DEFAULT_PAGE_LOAD_TIMEOUT_SECS,
            navigation_timeout_secs: DEFAULT_NAVIGATION_TIMEOUT_SECS,
            settle_millis: DEFAULT_SETTLE_MILLIS,
            headless: true,
        }
    }
}

/// LLM backend selection. Chosen once at job start; business logic never
/// branches on the provider past client construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Anthropic,
    OpenAi,
    AzureOpenAi,
}

/// Credentials and endpoint wiring for the enrichment stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: String,
    pub model: String,
    /// Overrides the provider's default endpoint. Required for Azure
    /// (the resource endpoint); optional elsewhere (proxies, gateways).
    pub endpoint: Option<String>,
    /// Azure deployment name; ignored by other providers.
    pub deployment: Option<String>,
    /// Azure api-version query parameter; ignored by other providers.
    pub api_version: Option<String>,
    pub max_tokens: u32,
}

impl LlmConfig {
    #[must_use]
    pub fn new(provider: LlmProvider, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            model: model.into(),
            endpoint: None,
            deployment: None,
            api_version: None,
            max_tokens: 1024,
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn with_deployment(mut self, deployment: impl Into<String>) -> Self {
        self.deployment = Some(deployment.into());
        self
    }

    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).expect("test url")
    }

    #[test]
    fn same_domain_filter_matches_host_only() {
        let seed = url("https://example.com/guide/a");
        assert!(LinkFilter::SameDomain.allows(&seed, &url("https://example.com/other")));
        assert!(!LinkFilter::SameDomain.allows(&seed, &url("https://example.org/guide/a")));
    }

    #[test]
    fn same_path_filter_requires_shared_prefix() {
        let seed = url("https://example.com/visas/work/overview");
        let filter = LinkFilter::SamePath;
        assert!(filter.allows(&seed, &url("https://example.com/visas/work/fees")));
        assert!(filter.allows(&seed, &url("https://example.com/visas/work/overview")));
        assert!(filter.allows(&seed, &url("https://example.com/visas/work")));
        assert!(!filter.allows(&seed, &url("https://example.com/study/courses")));
        assert!(!filter.allows(&seed, &url("https://example.org/visas/work/fees")));
    }

    #[test]
    fn same_path_prefix_respects_segment_boundaries() {
        let seed = url("https://example.com/guide/start");
        let filter = LinkFilter::SamePath;
        assert!(filter.allows(&seed, &url("https://example.com/guide/next")));
        assert!(!filter.allows(&seed, &url("https://example.com/guidebook/next")));
    }

    #[test]
    fn all_filter_is_unrestricted() {
        let seed = url("https://example.com/a");
        assert!(LinkFilter::All.allows(&seed, &url("https://elsewhere.net/x")));
    }
}
