//! URL cleaning and navigability checks.
//!
//! Pure helpers used when harvesting links: [`clean_url`] strips the noise
//! that makes two URLs to the same page compare unequal, and
//! [`is_navigable`] rejects URLs that point at assets or internal resource
//! ids rather than pages.

use url::Url;

/// Query keys that carry search intent and are worth keeping.
const ESSENTIAL_KEYS: [&str; 3] = ["_skw=", "q=", "s="];

/// File extensions that mark a URL as an image or metadata resource.
const BLOCKED_EXTENSIONS: [&str; 12] = [
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".webp", ".ico", ".xml", ".json", ".rss",
    ".atom",
];

/// Reduce a URL to the part needed to navigate back to the same page.
///
/// The fragment is dropped. Query parameters are scanned in order: keys in
/// [`ESSENTIAL_KEYS`] are kept; the scan stops entirely at the first key
/// starting with `_`, `hash=` or `itmmeta=`, since everything after a
/// tracking marker is session noise. Idempotent.
pub fn clean_url(url: &str) -> String {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let mut parts = without_fragment.splitn(2, '?');
    let base = parts.next().unwrap_or(without_fragment);
    let Some(query) = parts.next() else {
        return base.to_string();
    };

    let mut kept = Vec::new();
    for param in query.split('&') {
        if ESSENTIAL_KEYS.iter().any(|key| param.starts_with(key)) {
            kept.push(param);
        } else if param.starts_with('_')
            || param.starts_with("hash=")
            || param.starts_with("itmmeta=")
        {
            break;
        }
    }

    if kept.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{}", kept.join("&"))
    }
}

/// Whether a URL is worth offering to the agent as a navigation target.
///
/// Rejects overly long URLs, URLs without a scheme and host, paths ending in
/// a bare numeric segment (typically an internal object id, not a page), and
/// image/metadata extensions.
pub fn is_navigable(url: &str) -> bool {
    if url.len() > 64 {
        return false;
    }

    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    if parsed.scheme().is_empty() || parsed.host_str().is_none_or(str::is_empty) {
        return false;
    }

    if let Some(last) = parsed.path().rsplit('/').next() {
        if !last.is_empty() && last.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }

    let lower = url.to_ascii_lowercase();
    !BLOCKED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_url_drops_fragment_and_noise() {
        assert_eq!(
            clean_url("https://example.com/page#section"),
            "https://example.com/page"
        );
        assert_eq!(
            clean_url("https://example.com/s?q=rust&utm_source=feed"),
            "https://example.com/s?q=rust"
        );
    }

    #[test]
    fn clean_url_stops_at_tracking_markers() {
        // Everything after the first tracking-ish key is discarded, even
        // keys that would otherwise be essential.
        assert_eq!(
            clean_url("https://example.com/i?_trksid=abc&q=shoes"),
            "https://example.com/i"
        );
        assert_eq!(
            clean_url("https://example.com/i?q=shoes&hash=deadbeef&s=1"),
            "https://example.com/i?q=shoes"
        );
        assert_eq!(
            clean_url("https://example.com/i?_skw=laptop&itmmeta=xyz&s=2"),
            "https://example.com/i?_skw=laptop"
        );
    }

    #[test]
    fn clean_url_is_idempotent() {
        let urls = [
            "https://example.com/page#frag",
            "https://example.com/s?q=rust&utm_source=feed&s=3",
            "https://example.com/i?_trksid=abc&q=shoes",
            "https://example.com/plain",
        ];
        for url in urls {
            let once = clean_url(url);
            assert_eq!(clean_url(&once), once, "not idempotent for {url}");
        }
    }

    #[test]
    fn navigable_accepts_ordinary_pages() {
        assert!(is_navigable("https://example.com/docs/intro"));
        assert!(is_navigable("https://example.com/"));
    }

    #[test]
    fn navigable_rejects_long_urls_and_missing_host() {
        let long = format!("https://example.com/{}", "a".repeat(64));
        assert!(!is_navigable(&long));
        assert!(!is_navigable("/relative/path"));
        assert!(!is_navigable("not a url"));
    }

    #[test]
    fn navigable_rejects_numeric_trailing_segments() {
        assert!(!is_navigable("https://example.com/item/1234567"));
        assert!(is_navigable("https://example.com/item/1234a"));
    }

    #[test]
    fn navigable_rejects_asset_extensions() {
        assert!(!is_navigable("https://example.com/logo.png"));
        assert!(!is_navigable("https://example.com/feed.RSS"));
        assert!(!is_navigable("https://example.com/favicon.ico"));
        assert!(is_navigable("https://example.com/readme.html"));
    }

    #[test]
    fn navigable_postconditions_hold_for_accepted_urls() {
        let candidates = [
            "https://example.com/docs",
            "https://example.com/s?q=rust",
            "http://example.org/a/b",
        ];
        for url in candidates.into_iter().filter(|u| is_navigable(u)) {
            assert!(url.len() <= 64);
            let parsed = Url::parse(url).unwrap();
            assert!(!parsed.scheme().is_empty());
            assert!(parsed.host_str().is_some());
        }
    }
}
