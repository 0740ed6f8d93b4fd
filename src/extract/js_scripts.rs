//! JavaScript evaluated against the live page before the DOM is captured.
//!
//! Collapsible content has to be present in the tree before `page.content()`
//! runs, so expansion happens in the browser, not in the parser.

/// Expand accordions, `<details>`, collapsed panels, and inactive tabs.
///
/// Returns the number of regions touched. Click-based expansion only targets
/// visible, enabled controls; `<details>` is opened via its attribute.
pub const EXPAND_SECTIONS_SCRIPT: &str = r#"
    (() => {
        let expanded = 0;

        document.querySelectorAll('details:not([open])').forEach(el => {
            el.open = true;
            expanded++;
        });

        const clickable = [
            "button[aria-expanded='false']",
            ".accordion-button.collapsed",
            "[data-toggle='collapse']",
            "[role='tab'][aria-selected='false']",
        ].join(', ');

        document.querySelectorAll(clickable).forEach(el => {
            const style = window.getComputedStyle(el);
            const visible = style.display !== 'none'
                && style.visibility !== 'hidden'
                && el.offsetParent !== null;
            if (visible && !el.disabled) {
                try {
                    el.click();
                    expanded++;
                } catch (e) {
                    // Element removed its own handler mid-iteration; skip it.
                }
            }
        });

        document.querySelectorAll('.collapse:not(.show)').forEach(el => {
            el.classList.add('show');
            expanded++;
        });

        return expanded;
    })()
"#;

/// One scroll pass to the bottom and back to trigger lazy-loaded content.
pub const SCROLL_PAGE_SCRIPT: &str = r"
    (() => {
        window.scrollTo(0, document.body.scrollHeight);
        return document.body.scrollHeight;
    })()
";

/// Return the page to the top after the lazy-load pass.
pub const SCROLL_TOP_SCRIPT: &str = r"
    (() => {
        window.scrollTo(0, 0);
        return 0;
    })()
";

/// HTTP status of the navigation, via the Navigation Timing API.
///
/// `responseStatus` is 0 when the entry predates Chrome's support for it;
/// callers treat 0 as unknown.
pub const RESPONSE_STATUS_SCRIPT: &str = r"
    (() => {
        const nav = performance.getEntriesByType('navigation')[0];
        return nav && nav.responseStatus ? nav.responseStatus : 0;
    })()
";
