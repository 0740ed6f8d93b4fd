//! Robots.txt gate, evaluated once per job before crawling begins.
//!
//! A disallowed seed aborts the job immediately. An unreachable or missing
//! robots.txt allows the crawl: absence of rules is not a block signal.

use robotstxt::DefaultMatcher;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Result, ScrapeError};
use crate::utils::constants::ROBOTS_USER_AGENT;

/// Fetched robots.txt rules for one origin.
#[derive(Debug, Clone, Default)]
pub struct RobotsPolicy {
    content: Option<String>,
}

impl RobotsPolicy {
    /// Fetch and hold the robots.txt of the seed's origin.
    pub async fn fetch(http: &reqwest::Client, seed: &Url) -> Self {
        let robots_url = match seed.join("/robots.txt") {
            Ok(u) => u,
            Err(_) => return Self::default(),
        };

        match http.get(robots_url.clone()).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => {
                    debug!(url = %robots_url, bytes = body.len(), "robots.txt fetched");
                    Self {
                        content: Some(body),
                    }
                }
                Err(e) => {
                    warn!(url = %robots_url, error = %e, "robots.txt body unreadable, allowing");
                    Self::default()
                }
            },
            Ok(response) => {
                debug!(url = %robots_url, status = %response.status(), "no robots.txt, allowing");
                Self::default()
            }
            Err(e) => {
                warn!(url = %robots_url, error = %e, "robots.txt unreachable, allowing");
                Self::default()
            }
        }
    }

    /// Whether the rules permit fetching this URL.
    #[must_use]
    pub fn allows(&self, url: &Url) -> bool {
        match &self.content {
            None => true,
            Some(content) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(content, ROBOTS_USER_AGENT, url.as_str())
            }
        }
    }

    /// Enforce the gate for the seed: disallow is fatal to the job.
    pub fn check_seed(&self, seed: &Url) -> Result<()> {
        if self.allows(seed) {
            Ok(())
        } else {
            Err(ScrapeError::Blocked(format!(
                "robots.txt disallows seed URL {seed}"
            )))
        }
    }

    #[cfg(test)]
    pub(crate) fn from_content(content: &str) -> Self {
        Self {
            content: Some(content.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).expect("test url")
    }

    #[test]
    fn missing_robots_allows_everything() {
        let policy = RobotsPolicy::default();
        assert!(policy.allows(&url("https://example.com/anything")));
        assert!(policy.check_seed(&url("https://example.com/a")).is_ok());
    }

    #[test]
    fn disallowed_seed_is_fatal() {
        let policy = RobotsPolicy::from_content("User-agent: *\nDisallow: /private");
        assert!(policy.allows(&url("https://example.com/public")));
        assert!(!policy.allows(&url("https://example.com/private/page")));

        let err = policy
            .check_seed(&url("https://example.com/private/page"))
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Blocked(_)));
    }
}
