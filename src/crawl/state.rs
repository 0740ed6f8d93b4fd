//! Resumable crawl state.
//!
//! Every status transition is flushed to durable storage before the next
//! frontier pop, so a crash loses at most the page in flight. The store is an
//! injected trait so tests can substitute the in-memory implementation.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, ScrapeError};

/// Lifecycle of a discovered URL, keyed by its normalized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlStatus {
    Pending,
    Visited,
    Failed,
}

/// Repository of per-job crawl state.
pub trait StateStore: Send {
    /// Current status for a normalized URL key, if known.
    fn status(&self, key: &str) -> Option<UrlStatus>;

    /// Record a status transition. Must be durable before returning.
    fn mark(&mut self, key: &str, status: UrlStatus) -> Result<()>;

    /// Forget all state. Output artifacts are untouched; a fresh run
    /// re-derives state and overwrites them.
    fn reset(&mut self) -> Result<()>;

    /// Keys currently recorded as failed.
    fn failed_keys(&self) -> Vec<String>;
}

/// On-disk JSON shape of the state file.
#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    updated_at: chrono::DateTime<Utc>,
    urls: BTreeMap<String, UrlStatus>,
}

/// File-backed store writing `crawl_state.json` after every transition.
#[derive(Debug)]
pub struct JsonStateStore {
    path: PathBuf,
    urls: BTreeMap<String, UrlStatus>,
}

impl JsonStateStore {
    /// Load existing state from `state_dir`, or start empty.
    pub fn load(state_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(state_dir)
            .map_err(|e| ScrapeError::State(format!("cannot create state dir: {e}")))?;
        let path = state_dir.join("crawl_state.json");

        let urls = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| ScrapeError::State(format!("cannot read {}: {e}", path.display())))?;
            let file: StateFile = serde_json::from_str(&raw)
                .map_err(|e| ScrapeError::State(format!("corrupt state file: {e}")))?;
            info!(entries = file.urls.len(), path = %path.display(), "crawl state loaded");
            file.urls
        } else {
            debug!(path = %path.display(), "no existing crawl state");
            BTreeMap::new()
        };

        Ok(Self { path, urls })
    }

    fn persist(&self) -> Result<()> {
        let file = StateFile {
            updated_at: Utc::now(),
            urls: self.urls.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| ScrapeError::State(format!("cannot serialize state: {e}")))?;
        std::fs::write(&self.path, json)
            .map_err(|e| ScrapeError::State(format!("cannot write {}: {e}", self.path.display())))
    }
}

impl StateStore for JsonStateStore {
    fn status(&self, key: &str) -> Option<UrlStatus> {
        self.urls.get(key).copied()
    }

    fn mark(&mut self, key: &str, status: UrlStatus) -> Result<()> {
        self.urls.insert(key.to_string(), status);
        self.persist()?;
        debug!(key, ?status, "state transition flushed");
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.urls.clear();
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(|e| {
                ScrapeError::State(format!("cannot remove {}: {e}", self.path.display()))
            })?;
        }
        info!(path = %self.path.display(), "crawl state reset");
        Ok(())
    }

    fn failed_keys(&self) -> Vec<String> {
        self.urls
            .iter()
            .filter(|(_, status)| **status == UrlStatus::Failed)
            .map(|(key, _)| key.clone())
            .collect()
    }
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    urls: BTreeMap<String, UrlStatus>,
}

impl MemoryStateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn status(&self, key: &str) -> Option<UrlStatus> {
        self.urls.get(key).copied()
    }

    fn mark(&mut self, key: &str, status: UrlStatus) -> Result<()> {
        self.urls.insert(key.to_string(), status);
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.urls.clear();
        Ok(())
    }

    fn failed_keys(&self) -> Vec<String> {
        self.urls
            .iter()
            .filter(|(_, status)| **status == UrlStatus::Failed)
            .map(|(key, _)| key.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn transitions_survive_reload() {
        let dir = TempDir::new().expect("tempdir");
        {
            let mut store = JsonStateStore::load(dir.path()).expect("load");
            store
                .mark("https://example.com/a", UrlStatus::Visited)
                .expect("mark");
            store
                .mark("https://example.com/b", UrlStatus::Failed)
                .expect("mark");
        }
        let store = JsonStateStore::load(dir.path()).expect("reload");
        assert_eq!(store.status("https://example.com/a"), Some(UrlStatus::Visited));
        assert_eq!(store.status("https://example.com/b"), Some(UrlStatus::Failed));
        assert_eq!(store.failed_keys(), vec!["https://example.com/b".to_string()]);
    }

    #[test]
    fn reset_clears_state_but_not_other_files() {
        let dir = TempDir::new().expect("tempdir");
        let artifact = dir.path().join("unrelated.json");
        std::fs::write(&artifact, "{}").expect("write artifact");

        let mut store = JsonStateStore::load(dir.path()).expect("load");
        store.mark("k", UrlStatus::Visited).expect("mark");
        store.reset().expect("reset");

        assert_eq!(store.status("k"), None);
        assert!(!dir.path().join("crawl_state.json").exists());
        assert!(artifact.exists());
    }

    #[test]
    fn later_transition_overwrites_earlier() {
        let mut store = MemoryStateStore::new();
        store.mark("k", UrlStatus::Pending).expect("mark");
        store.mark("k", UrlStatus::Visited).expect("mark");
        assert_eq!(store.status("k"), Some(UrlStatus::Visited));
    }
}
