//! Shared fixtures: a canned-site page fetcher and config helpers.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use url::Url;

use sitescribe::utils::url_utils::normalize_url;
use sitescribe::{PageFetcher, RenderedPage, Result, ScrapeError, Settings};

/// Serves canned HTML by normalized URL key and records fetch order.
/// URLs in `failing` always time out; everything unknown 404s as a
/// navigation error.
#[derive(Default)]
pub struct StubFetcher {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    fetched: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        let parsed = Url::parse(url).expect("stub page url");
        self.pages.insert(normalize_url(&parsed), html.to_string());
        self
    }

    pub fn with_failing(mut self, url: &str) -> Self {
        let parsed = Url::parse(url).expect("stub failing url");
        self.failing.insert(normalize_url(&parsed));
        self
    }

    /// URLs fetched so far, in order, including retries.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().expect("fetched lock").clone()
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &Url) -> Result<RenderedPage> {
        let key = normalize_url(url);
        self.fetched.lock().expect("fetched lock").push(key.clone());

        if self.failing.contains(&key) {
            return Err(ScrapeError::Navigation {
                url: url.to_string(),
                reason: "stubbed navigation timeout".to_string(),
            });
        }

        match self.pages.get(&key) {
            Some(html) => Ok(RenderedPage {
                url: url.clone(),
                html: html.clone(),
                fetched_at: Utc::now(),
                status: Some(200),
            }),
            None => Err(ScrapeError::Navigation {
                url: url.to_string(),
                reason: "stubbed 404".to_string(),
            }),
        }
    }
}

/// Opt-in log output while debugging tests: `RUST_LOG=debug cargo test`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Settings with a zero delay window so tests run instantly.
pub fn fast_settings(data_dir: &std::path::Path) -> Settings {
    Settings {
        data_dir: data_dir.to_path_buf(),
        min_delay_secs: 0.0,
        max_delay_secs: 0.0,
        ..Settings::default()
    }
}

/// A content page whose body links sit inside paragraphs, so the parser
/// classifies them content-referenced.
pub fn page_with_links(title: &str, links: &[&str]) -> String {
    let link_html: String = links
        .iter()
        .map(|href| format!(r#"<p>Read about <a href="{href}">{href}</a> here.</p>"#))
        .collect();
    format!(
        "<html><head><title>{title}</title></head><body>\
         <main><h1>{title}</h1><p>Intro text for {title}.</p>\
         <h2>Details</h2>{link_html}</main></body></html>"
    )
}
