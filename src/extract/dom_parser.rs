//! Deterministic DOM-to-section extraction.
//!
//! Operates on the final rendered HTML (interactive regions are expanded in
//! the live page before capture, see `js_scripts`). Junk regions are skipped
//! by structural role, remaining text is grouped into sections at heading
//! boundaries: every heading opens a section titled with its verbatim text,
//! text accrues to the most recent heading, and a section's scope closes at
//! the next heading of equal-or-higher rank. No text is duplicated across
//! sections.

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

use super::schema::{DiscoveredLink, PageExtract, Section};
use super::section_detector::SectionDetector;
use crate::utils::url_utils::{normalize_url, resolve_link};

/// Parses rendered HTML for one page.
#[derive(Debug, Clone)]
pub struct DomParser {
    base: Url,
    detector: SectionDetector,
}

impl DomParser {
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self {
            base,
            detector: SectionDetector::new(),
        }
    }

    /// Extract title, ordered sections, and content-referenced links.
    ///
    /// Never fabricates content: a page with nothing left after junk removal
    /// yields an empty section list, not an error.
    #[must_use]
    pub fn parse(&self, html: &str) -> PageExtract {
        let doc = Html::parse_document(html);

        let title = self.extract_title(&doc);
        let sections = self.extract_sections(&doc, &title);
        let links = self.extract_links(&doc);

        PageExtract {
            title,
            sections,
            links,
        }
    }

    fn extract_title(&self, doc: &Html) -> String {
        static H1: once_cell::sync::Lazy<Selector> =
            once_cell::sync::Lazy::new(|| Selector::parse("h1").expect("static selector"));
        static TITLE: once_cell::sync::Lazy<Selector> =
            once_cell::sync::Lazy::new(|| Selector::parse("title").expect("static selector"));

        for h1 in doc.select(&H1) {
            if self.detector.inside_junk_region(h1) {
                continue;
            }
            let text = collapse(&h1.text().collect::<String>());
            if !text.is_empty() {
                return text;
            }
        }
        if let Some(title) = doc.select(&TITLE).next() {
            let text = collapse(&title.text().collect::<String>());
            if !text.is_empty() {
                return text;
            }
        }
        "Untitled".to_string()
    }

    fn extract_sections(&self, doc: &Html, page_title: &str) -> Vec<Section> {
        let mut walker = SectionWalker {
            detector: &self.detector,
            preamble: Vec::new(),
            sections: Vec::new(),
            open: None,
            inline: String::new(),
        };
        for child in doc.tree.root().children() {
            walker.walk(child);
        }
        walker.finish(page_title)
    }

    fn extract_links(&self, doc: &Html) -> Vec<DiscoveredLink> {
        static ANCHORS: once_cell::sync::Lazy<Selector> =
            once_cell::sync::Lazy::new(|| Selector::parse("a[href]").expect("static selector"));

        let mut seen: HashSet<String> = HashSet::new();
        let mut links = Vec::new();

        for anchor in doc.select(&ANCHORS) {
            if self.detector.is_structural_anchor(anchor) {
                continue;
            }
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Some(url) = resolve_link(&self.base, href) else {
                continue;
            };
            let key = normalize_url(&url);
            if key == normalize_url(&self.base) || !seen.insert(key) {
                continue;
            }
            links.push(DiscoveredLink {
                url,
                text: collapse(&anchor.text().collect::<String>()),
            });
        }

        links
    }
}

struct OpenSection {
    title: String,
    blocks: Vec<String>,
}

/// Document-order walk that accumulates text into heading-delimited sections.
struct SectionWalker<'a> {
    detector: &'a SectionDetector,
    preamble: Vec<String>,
    sections: Vec<Section>,
    open: Option<OpenSection>,
    inline: String,
}

impl SectionWalker<'_> {
    fn walk(&mut self, node: NodeRef<'_, Node>) {
        match node.value() {
            Node::Text(text) => {
                self.inline.push_str(text);
                self.inline.push(' ');
            }
            Node::Element(_) => {
                let Some(el) = ElementRef::wrap(node) else {
                    return;
                };
                let name = el.value().name();
                if name == "head" || self.detector.is_junk_region(el) {
                    return;
                }
                match name {
                    "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                        let title = collapse(&el.text().collect::<String>());
                        if !title.is_empty() {
                            self.on_heading(title);
                        }
                    }
                    "p" | "blockquote" | "pre" => {
                        self.flush_inline();
                        let text = collapse(&el.text().collect::<String>());
                        if !text.is_empty() {
                            self.push_block(format!("\n{text}\n"));
                        }
                    }
                    "li" => {
                        self.flush_inline();
                        let text = collapse(&el.text().collect::<String>());
                        if !text.is_empty() {
                            self.push_block(list_item_line(el, &text));
                        }
                    }
                    "table" => {
                        self.flush_inline();
                        for row in table_rows(el) {
                            self.push_block(row);
                        }
                    }
                    _ => {
                        for child in node.children() {
                            self.walk(child);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn on_heading(&mut self, title: String) {
        self.flush_inline();
        self.close_open();
        self.open = Some(OpenSection {
            title,
            blocks: Vec::new(),
        });
    }

    fn flush_inline(&mut self) {
        let text = collapse(&std::mem::take(&mut self.inline));
        if !text.is_empty() {
            self.push_block(text);
        }
    }

    fn push_block(&mut self, block: String) {
        match &mut self.open {
            Some(open) => open.blocks.push(block),
            None => self.preamble.push(block),
        }
    }

    fn close_open(&mut self) {
        if let Some(open) = self.open.take() {
            self.sections.push(Section {
                title: open.title,
                content: join_blocks(&open.blocks),
            });
        }
    }

    fn finish(mut self, page_title: &str) -> Vec<Section> {
        self.flush_inline();
        self.close_open();

        let preamble = join_blocks(&self.preamble);
        if !preamble.is_empty() {
            self.sections.insert(
                0,
                Section {
                    title: page_title.to_string(),
                    content: preamble,
                },
            );
        }
        self.sections
    }
}

/// Collapse whitespace runs to single spaces, trimming the ends.
fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Join content blocks, keeping paragraph breaks but no larger gaps.
fn join_blocks(blocks: &[String]) -> String {
    let mut joined = blocks.join("\n");
    while joined.contains("\n\n\n") {
        joined = joined.replace("\n\n\n", "\n\n");
    }
    joined.trim().to_string()
}

/// Render a list item with its marker: `1.` inside `<ol>`, `-` otherwise.
fn list_item_line(li: ElementRef<'_>, text: &str) -> String {
    let parent = li.parent().and_then(ElementRef::wrap);
    if let Some(parent) = parent
        && parent.value().name() == "ol"
    {
        let index = li
            .prev_siblings()
            .filter_map(ElementRef::wrap)
            .filter(|sib| sib.value().name() == "li")
            .count()
            + 1;
        return format!("{index}. {text}");
    }
    format!("- {text}")
}

/// Flatten a table into `cell | cell` rows.
fn table_rows(table: ElementRef<'_>) -> Vec<String> {
    static TR: once_cell::sync::Lazy<Selector> =
        once_cell::sync::Lazy::new(|| Selector::parse("tr").expect("static selector"));
    static CELL: once_cell::sync::Lazy<Selector> =
        once_cell::sync::Lazy::new(|| Selector::parse("td, th").expect("static selector"));

    table
        .select(&TR)
        .filter_map(|tr| {
            let cells: Vec<String> = tr
                .select(&CELL)
                .map(|cell| collapse(&cell.text().collect::<String>()))
                .collect();
            if cells.is_empty() {
                None
            } else {
                Some(cells.join(" | "))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> DomParser {
        DomParser::new(Url::parse("https://example.com/guide/start").expect("base url"))
    }

    const PAGE: &str = r##"
        <html>
        <head><title>Working Holiday Guide</title></head>
        <body>
            <nav><a href="/home">Home</a><a href="/guide/hidden">Hidden</a></nav>
            <div class="breadcrumb"><a href="/guide">Guide</a></div>
            <main>
                <h1>Working Holiday Guide</h1>
                <p>Plan your stay before you  arrive.</p>
                <h2>Requirements</h2>
                <p>You must hold a valid passport.</p>
                <ul><li>Be 18 to 30 years old</li><li>Hold return funds</li></ul>
                <h3>Evidence</h3>
                <p>Bank statements from the last <a href="/guide/funds">three months</a>.</p>
                <h2>Fees</h2>
                <table><tr><th>Stage</th><th>Cost</th></tr><tr><td>Application</td><td>$635</td></tr></table>
                <p>See the <a href="/guide/payments">payment options</a> page.</p>
                <p><a href="#top">Back to top</a></p>
            </main>
            <footer><a href="/privacy">Privacy</a></footer>
        </body>
        </html>
    "##;

    #[test]
    fn title_prefers_h1() {
        let extract = parser().parse(PAGE);
        assert_eq!(extract.title, "Working Holiday Guide");
    }

    #[test]
    fn sections_follow_dom_order_with_verbatim_titles() {
        let extract = parser().parse(PAGE);
        let titles: Vec<&str> = extract.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Working Holiday Guide", "Requirements", "Evidence", "Fees"]
        );
    }

    #[test]
    fn text_accrues_to_the_nearest_heading_without_duplication() {
        let extract = parser().parse(PAGE);
        let requirements = &extract.sections[1];
        assert!(requirements.content.contains("valid passport"));
        assert!(requirements.content.contains("- Be 18 to 30 years old"));
        assert!(requirements.content.contains("- Hold return funds"));
        assert!(!requirements.content.contains("Bank statements"));

        let evidence = &extract.sections[2];
        assert!(evidence.content.contains("Bank statements from the last three months."));
    }

    #[test]
    fn whitespace_is_collapsed_but_structure_preserved() {
        let extract = parser().parse(PAGE);
        let intro = &extract.sections[0];
        assert_eq!(intro.content, "Plan your stay before you arrive.");

        let fees = &extract.sections[3];
        assert!(fees.content.contains("Stage | Cost"));
        assert!(fees.content.contains("Application | $635"));
    }

    #[test]
    fn ordered_lists_keep_numbering() {
        let extract = parser().parse(
            "<main><h2>Steps</h2><ol><li>Apply online</li><li>Pay the fee</li></ol></main>",
        );
        assert_eq!(extract.sections[0].content, "1. Apply online\n2. Pay the fee");
    }

    #[test]
    fn junk_regions_are_stripped_and_their_links_ignored() {
        let extract = parser().parse(PAGE);
        let urls: Vec<&str> = extract.links.iter().map(|l| l.url.as_str()).collect();
        assert!(!urls.iter().any(|u| u.contains("/home")));
        assert!(!urls.iter().any(|u| u.contains("/guide/hidden")));
        assert!(!urls.iter().any(|u| u.contains("/privacy")));
        for section in &extract.sections {
            assert!(!section.content.contains("Privacy"));
        }
    }

    #[test]
    fn content_referenced_links_survive_in_document_order() {
        let extract = parser().parse(PAGE);
        let urls: Vec<&str> = extract.links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/guide/funds",
                "https://example.com/guide/payments"
            ]
        );
    }

    #[test]
    fn empty_page_yields_zero_sections() {
        let extract = parser().parse("<html><head><title>t</title></head><body></body></html>");
        assert!(extract.sections.is_empty());
        assert!(extract.links.is_empty());
    }

    #[test]
    fn headingless_content_becomes_one_titled_section() {
        let extract =
            parser().parse("<html><head><title>Note</title></head><body><p>Just text.</p></body></html>");
        assert_eq!(extract.sections.len(), 1);
        assert_eq!(extract.sections[0].title, "Note");
        assert_eq!(extract.sections[0].content, "Just text.");
    }
}
