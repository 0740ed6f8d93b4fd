//! Bounded BFS crawling: frontier, resumable state, robots gate, and the
//! crawl loop itself.

pub mod crawler;
pub mod fetcher;
pub mod frontier;
pub mod robots;
pub mod state;

pub use crawler::{CrawlOutcome, Crawler};
pub use fetcher::{PageFetcher, RenderedPage};
pub use frontier::{Frontier, FrontierEntry};
pub use robots::RobotsPolicy;
pub use state::{JsonStateStore, MemoryStateStore, StateStore, UrlStatus};
