//! Shared constants for browser configuration and crawling.

/// Realistic Chrome user agent presented by the browser context.
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Viewport applied once at context creation.
pub const VIEWPORT_WIDTH: u32 = 1920;
pub const VIEWPORT_HEIGHT: u32 = 1080;

/// Default anti-blocking delay window in seconds.
pub const DEFAULT_MIN_DELAY_SECS: f64 = 3.0;
pub const DEFAULT_MAX_DELAY_SECS: f64 = 6.0;

/// Default page navigation timeouts in seconds.
pub const DEFAULT_PAGE_LOAD_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 60;

/// Buffer after navigation settles for late JavaScript hydration, in milliseconds.
pub const DEFAULT_SETTLE_MILLIS: u64 = 3000;

/// Default crawl bounds.
pub const DEFAULT_MAX_DEPTH: u8 = 1;
pub const DEFAULT_MAX_PAGES: usize = 20;

/// User agent token checked against robots.txt rules.
pub const ROBOTS_USER_AGENT: &str = "sitescribe";
