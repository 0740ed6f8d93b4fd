//! Enrichment records: classified sections and the synthesized result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extract::schema::ParsedPage;

/// Closed enumeration of section classifications.
///
/// The LLM must pick exactly one of these; anything else fails closed to
/// [`SectionType::Other`] at the parse boundary. Never represented as a free
/// string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Overview,
    Requirements,
    Eligibility,
    Cost,
    Fees,
    Duration,
    Timeline,
    Process,
    HowToApply,
    Documents,
    Benefits,
    Conditions,
    Restrictions,
    RelatedInfo,
    Other,
}

impl SectionType {
    pub const ALL: &'static [SectionType] = &[
        SectionType::Overview,
        SectionType::Requirements,
        SectionType::Eligibility,
        SectionType::Cost,
        SectionType::Fees,
        SectionType::Duration,
        SectionType::Timeline,
        SectionType::Process,
        SectionType::HowToApply,
        SectionType::Documents,
        SectionType::Benefits,
        SectionType::Conditions,
        SectionType::Restrictions,
        SectionType::RelatedInfo,
        SectionType::Other,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Requirements => "requirements",
            Self::Eligibility => "eligibility",
            Self::Cost => "cost",
            Self::Fees => "fees",
            Self::Duration => "duration",
            Self::Timeline => "timeline",
            Self::Process => "process",
            Self::HowToApply => "how_to_apply",
            Self::Documents => "documents",
            Self::Benefits => "benefits",
            Self::Conditions => "conditions",
            Self::Restrictions => "restrictions",
            Self::RelatedInfo => "related_info",
            Self::Other => "other",
        }
    }

    /// Parse an LLM answer. Anything outside the enumeration is None;
    /// the caller resolves that to `Other`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
    }
}

/// A parsed section plus its classification. `title` and `content` are
/// byte-identical to the parsed record; enrichment only annotates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedSection {
    pub title: String,
    pub content: String,
    pub section_type: SectionType,
}

/// A parsed page after per-section classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedPage {
    pub url: String,
    pub depth: u8,
    pub title: String,
    pub sections: Vec<EnrichedSection>,
    pub outbound_links: Vec<String>,
    pub scraped_at: DateTime<Utc>,
    pub enriched_at: DateTime<Utc>,
}

impl EnrichedPage {
    /// Carry a parsed page over with the given per-section types.
    ///
    /// Panics in debug builds if the type count does not match the section
    /// count; the enricher always supplies one per section.
    #[must_use]
    pub fn from_parsed(parsed: &ParsedPage, types: Vec<SectionType>) -> Self {
        debug_assert_eq!(parsed.sections.len(), types.len());
        Self {
            url: parsed.url.clone(),
            depth: parsed.depth,
            title: parsed.title.clone(),
            sections: parsed
                .sections
                .iter()
                .zip(types)
                .map(|(section, section_type)| EnrichedSection {
                    title: section.title.clone(),
                    content: section.content.clone(),
                    section_type,
                })
                .collect(),
            outbound_links: parsed.outbound_links.clone(),
            scraped_at: parsed.scraped_at,
            enriched_at: Utc::now(),
        }
    }
}

/// Metadata about the crawl carried into the synthesized artifact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlMetadata {
    pub total_pages: usize,
    pub duration_seconds: f64,
    pub visited_urls: Vec<String>,
    pub failed_urls: Vec<String>,
}

/// The optional cross-page synthesis artifact. Additional output only; it
/// never replaces the per-page enriched records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesizedResult {
    pub job_name: String,
    pub seed_url: String,
    pub pages_merged: usize,
    pub crawl_metadata: CrawlMetadata,
    pub merged: serde_json::Value,
    pub synthesized_at: DateTime<Utc>,
}
