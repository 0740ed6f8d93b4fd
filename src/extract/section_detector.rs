//! Classification of DOM regions and anchors.
//!
//! Junk regions are identified by structural role (tag, ARIA role, chrome
//! class tokens), never by content heuristics that could discard legitimate
//! text. Anchors are *structural* (page chrome, excluded from the frontier)
//! or *content-referenced* (inside surviving content, frontier-eligible).

use once_cell::sync::Lazy;
use scraper::ElementRef;
use std::collections::HashSet;

/// Tags removed wholesale before section extraction.
const JUNK_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "iframe", "svg", "nav", "header", "footer", "aside",
];

/// ARIA roles marking page chrome.
const JUNK_ROLES: &[&str] = &["banner", "navigation", "complementary", "contentinfo"];

/// Class/id tokens marking chrome containers. Matched against whole tokens,
/// not substrings, so `badge` never matches `ad`.
const JUNK_CLASS_TOKENS: &[&str] = &[
    "breadcrumb",
    "breadcrumbs",
    "pagination",
    "cookie-banner",
    "cookie-notice",
    "cookie-consent",
    "sidebar",
    "advertisement",
    "back-to-top",
    "skip-link",
];

/// Closed set of link texts that mark navigation affordances.
static STRUCTURAL_LINK_TEXT: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "next",
        "prev",
        "previous",
        "home",
        "back",
        "back to top",
        "top",
        "skip to content",
        "skip to main content",
        "menu",
        "close",
    ]
    .into_iter()
    .collect()
});

/// Stateless region/anchor classifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct SectionDetector;

impl SectionDetector {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Whether this element roots a junk region to be skipped entirely.
    #[must_use]
    pub fn is_junk_region(&self, el: ElementRef<'_>) -> bool {
        let element = el.value();
        let name = element.name();
        if JUNK_TAGS.contains(&name) {
            return true;
        }
        if let Some(role) = element.attr("role")
            && JUNK_ROLES.contains(&role.to_ascii_lowercase().as_str())
        {
            return true;
        }
        if element
            .classes()
            .any(|class| JUNK_CLASS_TOKENS.contains(&class.to_ascii_lowercase().as_str()))
        {
            return true;
        }
        if let Some(id) = element.id()
            && JUNK_CLASS_TOKENS.contains(&id.to_ascii_lowercase().as_str())
        {
            return true;
        }
        false
    }

    /// Whether any ancestor of this element roots a junk region.
    #[must_use]
    pub fn inside_junk_region(&self, el: ElementRef<'_>) -> bool {
        el.ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| self.is_junk_region(ancestor))
    }

    /// Whether an anchor is part of page chrome rather than content.
    ///
    /// Structural means nav/menu/pagination ancestry or link text from the
    /// closed affordance set; everything else inside surviving content is
    /// content-referenced.
    #[must_use]
    pub fn is_structural_anchor(&self, anchor: ElementRef<'_>) -> bool {
        if self.inside_junk_region(anchor) {
            return true;
        }

        let has_menu_ancestry = anchor.ancestors().filter_map(ElementRef::wrap).any(|el| {
            el.value().classes().any(|class| {
                let class = class.to_ascii_lowercase();
                class == "menu" || class == "nav" || class == "tabs" || class == "toc"
            })
        });
        if has_menu_ancestry {
            return true;
        }

        let text = anchor.text().collect::<String>();
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        if STRUCTURAL_LINK_TEXT.contains(text.as_str()) {
            return true;
        }

        if let Some(href) = anchor.value().attr("href")
            && (href == "#" || href.eq_ignore_ascii_case("#top"))
        {
            return true;
        }

        false
    }
}
