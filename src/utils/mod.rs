//! Small shared utilities: constants, URL handling, delays.

pub mod constants;
pub mod delays;
pub mod url_utils;

pub use delays::{pick_delay, random_delay};
pub use url_utils::{normalize_url, resolve_link, url_slug};
