//! LLM enrichment: per-section classification and cross-page synthesis.
//!
//! The scraped record is ground truth. Enrichment only annotates: every
//! section keeps its exact bytes, a classification failure resolves to
//! `other`, and a section is never dropped.

pub mod llm;
pub mod prompts;
pub mod schema;

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::JobConfig;
use crate::error::Result;
use crate::extract::schema::ParsedPage;
use llm::{CompletionRequest, LlmClient};

pub use llm::{AnthropicClient, AzureOpenAiClient, OpenAiClient, build_client};
pub use schema::{CrawlMetadata, EnrichedPage, EnrichedSection, SectionType, SynthesizedResult};

/// Maps parsed pages to enriched pages through the configured LLM backend.
pub struct Enricher {
    client: Arc<dyn LlmClient>,
}

impl Enricher {
    #[must_use]
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Classify every section of a page. Infallible by design: uncertain or
    /// broken classifications become [`SectionType::Other`].
    pub async fn enrich_page(&self, page: &ParsedPage) -> EnrichedPage {
        debug!(url = %page.url, sections = page.sections.len(), "enriching page");

        let mut types = Vec::with_capacity(page.sections.len());
        for section in &page.sections {
            types.push(self.classify_section(&section.title, &section.content).await);
        }

        EnrichedPage::from_parsed(page, types)
    }

    /// Enrich pages preserving the crawler's visit order.
    pub async fn enrich_pages(&self, pages: &[ParsedPage]) -> Vec<EnrichedPage> {
        let mut enriched = Vec::with_capacity(pages.len());
        for page in pages {
            enriched.push(self.enrich_page(page).await);
        }
        info!(pages = enriched.len(), "enrichment complete");
        enriched
    }

    async fn classify_section(&self, title: &str, content: &str) -> SectionType {
        let request = CompletionRequest::new(prompts::classification_prompt(title, content))
            .with_schema(prompts::classification_schema())
            .with_max_tokens(64);

        let response = match self.client.complete(request).await {
            Ok(value) => value,
            Err(e) => {
                warn!(title, error = %e, "classification failed, falling back to other");
                return SectionType::Other;
            }
        };

        let answer = response.get("section_type").and_then(Value::as_str);
        match answer.and_then(SectionType::parse) {
            Some(section_type) => section_type,
            None => {
                warn!(
                    title,
                    answer = answer.unwrap_or("<missing>"),
                    "answer outside the enumeration, falling back to other"
                );
                SectionType::Other
            }
        }
    }

    /// Merge all enriched pages into one consolidated record. Config-gated;
    /// the result is an additional artifact, never a replacement.
    pub async fn synthesize(
        &self,
        config: &JobConfig,
        pages: &[EnrichedPage],
        crawl_metadata: CrawlMetadata,
    ) -> Result<SynthesizedResult> {
        info!(pages = pages.len(), "synthesizing cross-page result");

        let request = CompletionRequest::new(prompts::synthesis_prompt(pages))
            .with_max_tokens(8192);
        let merged = self.client.complete(request).await?;

        Ok(SynthesizedResult {
            job_name: config.job_name().to_string(),
            seed_url: config.seed().to_string(),
            pages_merged: pages.len(),
            crawl_metadata,
            merged,
            synthesized_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::schema::Section;
    use async_trait::async_trait;
    use serde_json::json;

    /// Canned backend: answers from a fixed list, then errors.
    #[derive(Debug)]
    struct ScriptedClient {
        answers: std::sync::Mutex<Vec<std::result::Result<Value, String>>>,
    }

    impl ScriptedClient {
        fn new(answers: Vec<std::result::Result<Value, String>>) -> Arc<Self> {
            Arc::new(Self {
                answers: std::sync::Mutex::new(answers),
            })
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn complete(&self, _request: CompletionRequest) -> Result<Value> {
            let mut answers = self.answers.lock().expect("lock");
            if answers.is_empty() {
                return Err(crate::error::ScrapeError::Llm("exhausted".into()));
            }
            answers
                .remove(0)
                .map_err(crate::error::ScrapeError::Llm)
        }

        fn provider(&self) -> &'static str {
            "scripted"
        }
    }

    fn page() -> ParsedPage {
        ParsedPage {
            url: "https://example.com/visa".to_string(),
            depth: 0,
            title: "Visa".to_string(),
            sections: vec![
                Section {
                    title: "What it costs".to_string(),
                    content: "The application fee is $635.".to_string(),
                },
                Section {
                    title: "Weird widget".to_string(),
                    content: "Unclassifiable text.".to_string(),
                },
                Section {
                    title: "Processing".to_string(),
                    content: "Takes 4 months.".to_string(),
                },
            ],
            outbound_links: vec![],
            scraped_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn classifications_apply_in_order() {
        let client = ScriptedClient::new(vec![
            Ok(json!({"section_type": "fees"})),
            Ok(json!({"section_type": "other"})),
            Ok(json!({"section_type": "duration"})),
        ]);
        let enricher = Enricher::new(client);
        let enriched = enricher.enrich_page(&page()).await;

        let types: Vec<SectionType> = enriched.sections.iter().map(|s| s.section_type).collect();
        assert_eq!(
            types,
            vec![SectionType::Fees, SectionType::Other, SectionType::Duration]
        );
    }

    #[tokio::test]
    async fn titles_and_content_are_byte_identical() {
        let client = ScriptedClient::new(vec![
            Ok(json!({"section_type": "fees"})),
            Ok(json!({"section_type": "overview"})),
            Ok(json!({"section_type": "timeline"})),
        ]);
        let enricher = Enricher::new(client);
        let parsed = page();
        let enriched = enricher.enrich_page(&parsed).await;

        assert_eq!(enriched.sections.len(), parsed.sections.len());
        for (before, after) in parsed.sections.iter().zip(&enriched.sections) {
            assert_eq!(before.title, after.title);
            assert_eq!(before.content, after.content);
        }
    }

    #[tokio::test]
    async fn out_of_enumeration_answers_fail_closed() {
        let client = ScriptedClient::new(vec![
            Ok(json!({"section_type": "pricing"})),
            Ok(json!({"unexpected": true})),
            Err("transport down".to_string()),
        ]);
        let enricher = Enricher::new(client);
        let enriched = enricher.enrich_page(&page()).await;

        // Malformed, off-enumeration, and failed responses all keep the
        // section with type `other`; nothing is dropped.
        assert_eq!(enriched.sections.len(), 3);
        assert!(enriched
            .sections
            .iter()
            .all(|s| s.section_type == SectionType::Other));
    }

    #[tokio::test]
    async fn synthesis_wraps_the_merged_value() {
        let client = ScriptedClient::new(vec![
            Ok(json!({"section_type": "fees"})),
            Ok(json!({"section_type": "other"})),
            Ok(json!({"section_type": "duration"})),
            Ok(json!({"visa": {"fee": "$635", "processing": "4 months"}})),
        ]);
        let enricher = Enricher::new(client);
        let enriched = vec![enricher.enrich_page(&page()).await];

        let config = JobConfig::builder()
            .seed_url("https://example.com/visa")
            .job_name("visa")
            .build()
            .expect("config");
        let result = enricher
            .synthesize(&config, &enriched, CrawlMetadata::default())
            .await
            .expect("synthesis");

        assert_eq!(result.pages_merged, 1);
        assert_eq!(result.merged["visa"]["fee"], "$635");
    }
}
