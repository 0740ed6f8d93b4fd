//! Prompt and schema construction for the enrichment stage.
//!
//! Classification is pinned to the closed enumeration and zero temperature;
//! the model annotates, it never rewrites.

use serde_json::{Value, json};

use super::schema::{EnrichedPage, SectionType};

/// How much section content the classification prompt carries.
const CONTENT_PREVIEW_CHARS: usize = 300;

/// Truncate on a char boundary without touching the original text.
#[must_use]
pub fn content_preview(content: &str) -> &str {
    match content.char_indices().nth(CONTENT_PREVIEW_CHARS) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

/// The per-section classification prompt.
#[must_use]
pub fn classification_prompt(title: &str, content: &str) -> String {
    let types = SectionType::ALL
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let preview = content_preview(content);

    format!(
        "Classify this content section into exactly ONE of these types:\n\
         {types}\n\
         \n\
         Section Title: {title}\n\
         Content Preview: {preview}\n\
         \n\
         Rules:\n\
         - Respond with JSON only: {{\"section_type\": \"<type>\"}}\n\
         - The type must be one of the listed values, nothing else\n\
         - If unsure, answer \"other\" rather than guessing\n\
         - Do not rewrite, summarize, or infer anything about the content"
    )
}

/// JSON schema constraining the classification response to the enumeration.
#[must_use]
pub fn classification_schema() -> Value {
    let variants: Vec<&str> = SectionType::ALL.iter().map(|t| t.as_str()).collect();
    json!({
        "type": "object",
        "properties": {
            "section_type": {
                "type": "string",
                "enum": variants
            }
        },
        "required": ["section_type"],
        "additionalProperties": false
    })
}

/// The cross-page synthesis prompt: merge, deduplicate, keep every fact.
#[must_use]
pub fn synthesis_prompt(pages: &[EnrichedPage]) -> String {
    let mut pages_text = String::new();
    for (i, page) in pages.iter().enumerate() {
        pages_text.push_str(&format!("\nPage {}:\n- URL: {}\n- Title: {}\n", i + 1, page.url, page.title));
        for section in &page.sections {
            pages_text.push_str(&format!(
                "- [{}] {}: {}\n",
                section.section_type.as_str(),
                section.title,
                content_preview(&section.content)
            ));
        }
    }

    format!(
        "You have classified sections extracted from {count} related webpages.\n\
         Combine them into ONE consolidated JSON object that:\n\
         1. Groups related information under clear, consistent keys\n\
         2. Removes duplicated facts that appear on several pages\n\
         3. Keeps every distinct fact; never drop information to shorten output\n\
         4. Uses only facts present in the input; do not infer or invent\n\
         \n\
         Pages:\n\
         {pages_text}\n\
         Respond with the JSON object only, no commentary.",
        count = pages.len()
    )
}
