//! URL normalization, identity keys, and filesystem slugs.
//!
//! Two URLs with the same normalized key are the same page regardless of how
//! they were reached: the key is scheme + host + path + sorted query, with
//! the fragment and any trailing slash stripped.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;
use xxhash_rust::xxh3::xxh3_64;

/// Compute the normalized identity key for a URL.
///
/// The query string is re-serialized with its pairs sorted so that
/// `?b=2&a=1` and `?a=1&b=2` collapse to the same key.
#[must_use]
pub fn normalize_url(url: &Url) -> String {
    let mut key = format!("{}://", url.scheme());

    if let Some(host) = url.host_str() {
        key.push_str(host);
    }
    if let Some(port) = url.port() {
        key.push(':');
        key.push_str(&port.to_string());
    }

    let path = url.path().trim_end_matches('/');
    if path.is_empty() {
        key.push('/');
    } else {
        key.push_str(path);
    }

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if !pairs.is_empty() {
        pairs.sort();
        let query = pairs
            .iter()
            .map(|(k, v)| {
                if v.is_empty() {
                    k.clone()
                } else {
                    format!("{k}={v}")
                }
            })
            .collect::<Vec<_>>()
            .join("&");
        key.push('?');
        key.push_str(&query);
    }

    key
}

/// Resolve an href against its page URL, keeping only fetchable http(s) links.
///
/// Data/javascript/mailto schemes and bare same-page fragments resolve to None.
#[must_use]
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let trimmed = href.trim();
    if trimmed.is_empty() || trimmed == "#" {
        return None;
    }
    let lowered = trimmed.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("data:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("sms:")
        || lowered.starts_with("ftp:")
    {
        return None;
    }

    let resolved = base.join(trimmed).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }

    // A fragment pointing back into the same document is not a new page.
    if resolved.fragment().is_some()
        && resolved.path() == base.path()
        && resolved.host_str() == base.host_str()
        && resolved.query() == base.query()
    {
        return None;
    }

    Some(resolved)
}

/// Derive a deterministic, collision-resistant filename slug for a URL.
///
/// The readable part comes from the sanitized path; the 16-hex xxh3 suffix of
/// the full normalized key keeps distinct URLs distinct even when their paths
/// sanitize to the same text. Same URL, same slug, across runs.
#[must_use]
pub fn url_slug(url: &Url) -> String {
    static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("static regex"));

    let key = normalize_url(url);
    let hash = xxh3_64(key.as_bytes());

    let path = url.path().trim_matches('/').to_ascii_lowercase();
    let readable = NON_WORD.replace_all(&path, "_");
    let readable = readable.trim_matches('_');
    let readable = if readable.is_empty() { "index" } else { readable };
    let readable: String = readable.chars().take(80).collect();

    sanitize_filename::sanitize(format!("{readable}_{hash:016x}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).expect("test url")
    }

    #[test]
    fn normalization_strips_fragment_and_trailing_slash() {
        let a = normalize_url(&url("https://example.com/guide/a/#section"));
        let b = normalize_url(&url("https://example.com/guide/a"));
        assert_eq!(a, b);
    }

    #[test]
    fn normalization_sorts_query_pairs() {
        let a = normalize_url(&url("https://example.com/p?b=2&a=1"));
        let b = normalize_url(&url("https://example.com/p?a=1&b=2"));
        assert_eq!(a, b);
        assert_eq!(a, "https://example.com/p?a=1&b=2");
    }

    #[test]
    fn normalization_keeps_distinct_hosts_distinct() {
        let a = normalize_url(&url("https://example.com/a"));
        let b = normalize_url(&url("https://example.org/a"));
        assert_ne!(a, b);
    }

    #[test]
    fn root_path_normalizes_to_slash() {
        assert_eq!(normalize_url(&url("https://example.com")), "https://example.com/");
        assert_eq!(normalize_url(&url("https://example.com/")), "https://example.com/");
    }

    #[test]
    fn resolve_skips_non_http_schemes() {
        let base = url("https://example.com/page");
        assert!(resolve_link(&base, "mailto:x@example.com").is_none());
        assert!(resolve_link(&base, "javascript:void(0)").is_none());
        assert!(resolve_link(&base, "tel:+1555").is_none());
        assert!(resolve_link(&base, "#").is_none());
    }

    #[test]
    fn resolve_skips_same_page_fragments() {
        let base = url("https://example.com/page");
        assert!(resolve_link(&base, "#details").is_none());
        assert!(resolve_link(&base, "/page#details").is_none());
        // A fragment on a different page is still a real link.
        assert!(resolve_link(&base, "/other#details").is_some());
    }

    #[test]
    fn resolve_makes_relative_links_absolute() {
        let base = url("https://example.com/guide/a");
        let resolved = resolve_link(&base, "b").expect("resolved");
        assert_eq!(resolved.as_str(), "https://example.com/guide/b");
    }

    #[test]
    fn slug_is_deterministic_and_collision_resistant() {
        let a = url_slug(&url("https://example.com/visas/work/visa-482"));
        let b = url_slug(&url("https://example.com/visas/work/visa-482"));
        assert_eq!(a, b);
        assert!(a.starts_with("visas_work_visa_482_"));

        // Paths that sanitize identically still get distinct slugs.
        let c = url_slug(&url("https://example.com/visas/work/visa.482"));
        assert_ne!(a, c);
    }

    #[test]
    fn slug_for_root_url_is_stable() {
        let a = url_slug(&url("https://example.com/"));
        assert!(a.starts_with("index_"));
    }
}
