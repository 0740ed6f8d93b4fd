//! Job-scoped browser session.
//!
//! One browser process and one persistent context per job, created by the
//! orchestrator and threaded through the crawler as an explicit handle.
//! Pages are opened on demand, rendered to hydration quiescence, expanded,
//! and serialized; cookie/session state persists across fetches within the
//! job.

pub mod setup;

use chromiumoxide::browser::Browser;
use chrono::Utc;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Settings;
use crate::crawl::fetcher::{PageFetcher, RenderedPage};
use crate::error::{Result, ScrapeError};
use crate::extract::js_scripts::{
    EXPAND_SECTIONS_SCRIPT, RESPONSE_STATUS_SCRIPT, SCROLL_PAGE_SCRIPT, SCROLL_TOP_SCRIPT,
};

/// Wrap a page operation with an explicit timeout so slow or wedged
/// navigations cannot hang the job.
async fn with_page_timeout<F, T, E>(
    operation: F,
    timeout_secs: u64,
    operation_name: &str,
    url: &Url,
) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    match tokio::time::timeout(Duration::from_secs(timeout_secs), operation).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ScrapeError::Navigation {
            url: url.to_string(),
            reason: format!("{operation_name} failed: {e}"),
        }),
        Err(_) => Err(ScrapeError::Navigation {
            url: url.to_string(),
            reason: format!("{operation_name} timed out after {timeout_secs}s"),
        }),
    }
}

/// Owns the browser process and context for one job.
pub struct BrowserManager {
    browser: Browser,
    handler_task: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
    page_load_timeout_secs: u64,
    navigation_timeout_secs: u64,
    settle_millis: u64,
}

impl BrowserManager {
    /// Launch the browser with the job's settings.
    pub async fn launch(settings: &Settings) -> Result<Self> {
        let (browser, handler_task, user_data_dir) = setup::launch_browser(settings.headless)
            .await
            .map_err(|e| ScrapeError::BrowserLaunch(format!("{e:#}")))?;

        info!(headless = settings.headless, "browser session started");
        Ok(Self {
            browser,
            handler_task,
            user_data_dir: Some(user_data_dir),
            page_load_timeout_secs: settings.page_load_timeout_secs,
            navigation_timeout_secs: settings.navigation_timeout_secs,
            settle_millis: settings.settle_millis,
        })
    }

    /// Navigate to a URL and return the settled, expanded DOM.
    pub async fn open_page(&self, url: &Url) -> Result<RenderedPage> {
        let page = self.browser.new_page("about:blank").await.map_err(|e| {
            ScrapeError::Navigation {
                url: url.to_string(),
                reason: format!("cannot create page: {e}"),
            }
        })?;

        let result = self.render(&page, url).await;

        // The page is per-fetch; the context and its cookies live on.
        if let Err(e) = page.close().await {
            debug!(url = %url, error = %e, "page close failed");
        }

        result
    }

    async fn render(&self, page: &chromiumoxide::Page, url: &Url) -> Result<RenderedPage> {
        with_page_timeout(
            page.goto(url.as_str()),
            self.page_load_timeout_secs,
            "navigation",
            url,
        )
        .await?;

        with_page_timeout(
            page.wait_for_navigation(),
            self.navigation_timeout_secs,
            "page load",
            url,
        )
        .await?;

        // Hydration buffer: frameworks keep mutating the DOM after load.
        tokio::time::sleep(Duration::from_millis(self.settle_millis)).await;

        let status = self.navigation_status(page, url).await;
        if let Some(code @ (403 | 429)) = status {
            return Err(ScrapeError::Blocked(format!(
                "{url} answered HTTP {code}"
            )));
        }

        match page.evaluate(EXPAND_SECTIONS_SCRIPT).await {
            Ok(result) => {
                let expanded = result.into_value::<i64>().unwrap_or(0);
                if expanded > 0 {
                    debug!(url = %url, expanded, "interactive regions expanded");
                    tokio::time::sleep(Duration::from_millis(300)).await;
                }
            }
            Err(e) => warn!(url = %url, error = %e, "section expansion script failed"),
        }

        // One scroll pass for lazy-loaded content, then back to the top.
        if let Err(e) = page.evaluate(SCROLL_PAGE_SCRIPT).await {
            debug!(url = %url, error = %e, "scroll failed");
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
        if let Err(e) = page.evaluate(SCROLL_TOP_SCRIPT).await {
            debug!(url = %url, error = %e, "scroll to top failed");
        }

        let html = with_page_timeout(
            page.content(),
            self.page_load_timeout_secs,
            "content capture",
            url,
        )
        .await?;

        debug!(url = %url, bytes = html.len(), "page rendered");
        Ok(RenderedPage {
            url: url.clone(),
            html,
            fetched_at: Utc::now(),
            status,
        })
    }

    async fn navigation_status(&self, page: &chromiumoxide::Page, url: &Url) -> Option<u16> {
        match page.evaluate(RESPONSE_STATUS_SCRIPT).await {
            Ok(result) => match result.into_value::<i64>() {
                Ok(0) | Err(_) => None,
                Ok(code) => u16::try_from(code).ok(),
            },
            Err(e) => {
                debug!(url = %url, error = %e, "status probe failed");
                None
            }
        }
    }

    /// Shut the browser down and remove its profile directory.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "browser close failed");
        }
        if let Err(e) = self.browser.wait().await {
            debug!(error = %e, "browser wait failed");
        }
        self.handler_task.abort();
        if let Some(dir) = self.user_data_dir.take()
            && let Err(e) = std::fs::remove_dir_all(&dir)
        {
            warn!(dir = %dir.display(), error = %e, "profile cleanup failed");
        }
        info!("browser session closed");
    }
}

impl Drop for BrowserManager {
    fn drop(&mut self) {
        self.handler_task.abort();
        // Browser::drop kills the Chrome process; only the profile directory
        // needs explicit cleanup when close() was skipped.
        if let Some(dir) = self.user_data_dir.take() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}

#[async_trait::async_trait]
impl PageFetcher for BrowserManager {
    async fn fetch(&self, url: &Url) -> Result<RenderedPage> {
        self.open_page(url).await
    }
}
