//! On-disk artifact layout for one job.
//!
//! ```text
//! data/{job-name}/
//!   raw_pages/{url-slug}.html
//!   parsed_pages/{url-slug}.json
//!   enriched_pages/{url-slug}.json
//!   final_result.json
//!   state/crawl_state.json
//! ```
//!
//! All writes overwrite; nothing in this pipeline appends. The slug is a
//! deterministic function of the normalized URL, so re-runs land on the same
//! files.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::enrich::schema::{EnrichedPage, SynthesizedResult};
use crate::error::{Result, ScrapeError};
use crate::extract::schema::ParsedPage;

/// Owns the per-job output tree once written.
#[derive(Debug, Clone)]
pub struct FileManager {
    job_root: PathBuf,
}

impl FileManager {
    /// Create the job's directory tree under `data_dir`.
    pub fn create(data_dir: &Path, job_name: &str) -> Result<Self> {
        let job_root = data_dir.join(job_name);
        for sub in ["raw_pages", "parsed_pages", "enriched_pages", "state"] {
            std::fs::create_dir_all(job_root.join(sub)).map_err(|e| {
                ScrapeError::Storage(format!("cannot create {}/{sub}: {e}", job_root.display()))
            })?;
        }
        debug!(root = %job_root.display(), "job directories ensured");
        Ok(Self { job_root })
    }

    #[must_use]
    pub fn job_root(&self) -> &Path {
        &self.job_root
    }

    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        self.job_root.join("state")
    }

    pub async fn save_raw_html(&self, slug: &str, html: &str) -> Result<PathBuf> {
        let path = self.job_root.join("raw_pages").join(format!("{slug}.html"));
        tokio::fs::write(&path, html)
            .await
            .map_err(|e| ScrapeError::Storage(format!("cannot write {}: {e}", path.display())))?;
        debug!(path = %path.display(), bytes = html.len(), "raw html saved");
        Ok(path)
    }

    pub async fn save_parsed(&self, slug: &str, page: &ParsedPage) -> Result<PathBuf> {
        self.save_json(self.job_root.join("parsed_pages").join(format!("{slug}.json")), page)
            .await
    }

    pub async fn save_enriched(&self, slug: &str, page: &EnrichedPage) -> Result<PathBuf> {
        self.save_json(
            self.job_root.join("enriched_pages").join(format!("{slug}.json")),
            page,
        )
        .await
    }

    pub async fn save_final(&self, result: &SynthesizedResult) -> Result<PathBuf> {
        self.save_json(self.job_root.join("final_result.json"), result).await
    }

    async fn save_json<T: Serialize>(&self, path: PathBuf, value: &T) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| ScrapeError::Storage(format!("cannot serialize for {}: {e}", path.display())))?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| ScrapeError::Storage(format!("cannot write {}: {e}", path.display())))?;
        debug!(path = %path.display(), "json saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::schema::Section;
    use chrono::Utc;
    use tempfile::TempDir;

    fn parsed_page() -> ParsedPage {
        ParsedPage {
            url: "https://example.com/a".to_string(),
            depth: 0,
            title: "A".to_string(),
            sections: vec![Section {
                title: "Overview".to_string(),
                content: "Text.".to_string(),
            }],
            outbound_links: vec![],
            scraped_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn creates_layout_and_overwrites() {
        let dir = TempDir::new().expect("tempdir");
        let files = FileManager::create(dir.path(), "job").expect("create");

        assert!(files.job_root().join("raw_pages").is_dir());
        assert!(files.job_root().join("parsed_pages").is_dir());
        assert!(files.job_root().join("enriched_pages").is_dir());
        assert!(files.state_dir().is_dir());

        let first = files.save_raw_html("slug", "<html>1</html>").await.expect("write");
        files.save_raw_html("slug", "<html>2</html>").await.expect("overwrite");
        let content = std::fs::read_to_string(first).expect("read");
        assert_eq!(content, "<html>2</html>");
    }

    #[tokio::test]
    async fn parsed_json_lands_under_parsed_pages() {
        let dir = TempDir::new().expect("tempdir");
        let files = FileManager::create(dir.path(), "job").expect("create");
        let path = files.save_parsed("slug", &parsed_page()).await.expect("save");
        assert!(path.ends_with("parsed_pages/slug.json"));
        let raw = std::fs::read_to_string(path).expect("read");
        assert!(raw.contains("\"Overview\""));
    }
}
