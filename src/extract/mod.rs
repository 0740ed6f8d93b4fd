//! Page extraction: junk stripping, heading-boundary sectioning, and
//! structural vs content-referenced anchor classification.

pub mod dom_parser;
pub mod js_scripts;
pub mod schema;
pub mod section_detector;

pub use dom_parser::DomParser;
pub use schema::{DiscoveredLink, PageExtract, ParsedPage, Section};
pub use section_detector::SectionDetector;
