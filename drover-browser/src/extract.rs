//! Page markup to filtered, readable Markdown.
//!
//! Conversion runs in two stages: `htmd` turns the raw markup into Markdown
//! (ATX headings, anchors reduced to their text, images to `[IMAGE: alt]`
//! placeholders), then a line-level filter keeps only "meaningful sentences"
//! so navigation labels and single-word buttons drop out while prices, codes
//! and genuine prose survive regardless of script.

use htmd::options::{BulletListMarker, HeadingStyle, Options};
use htmd::{Element, HtmlToMarkdown};
use regex::Regex;

/// Hard cap on extracted output. The cutoff is not sentence-aware and may
/// land mid-line.
pub const MAX_EXTRACT_CHARS: usize = 8192;

const PAGE_START: &str = "[Start of page]";
const PAGE_END: &str = "[End of page]";

/// Sentence-terminal punctuation across scripts (Latin, CJK, Devanagari,
/// Arabic).
const TERMINAL_PUNCTUATION: [char; 10] = ['.', ',', '，', '!', '?', '。', '！', '？', '।', '۔'];

/// Markup that never contributes readable content.
const SKIPPED_TAGS: [&str; 6] = ["head", "script", "style", "noscript", "meta", "link"];

/// Whether a line of text qualifies as a meaningful sentence.
///
/// True when the text contains a digit (prices, error codes), has at least
/// five whitespace-delimited tokens, or has more than four tokens and ends
/// in terminal punctuation.
pub fn is_sentence(text: &str) -> bool {
    let text = text.trim();
    if text.chars().any(char::is_numeric) {
        return true;
    }
    let word_count = text.split_whitespace().count();
    if word_count >= 5 {
        return true;
    }
    word_count > 4 && TERMINAL_PUNCTUATION.iter().any(|p| text.ends_with(*p))
}

fn converter() -> HtmlToMarkdown {
    HtmlToMarkdown::builder()
        .skip_tags(SKIPPED_TAGS.to_vec())
        .options(Options {
            heading_style: HeadingStyle::Atx,
            bullet_list_marker: BulletListMarker::Asterisk,
            ..Default::default()
        })
        // De-hyperlink anchors: keep the display text, drop the target.
        .add_handler(vec!["a"], |el: Element| Some(el.content.to_string()))
        // Keep image markdown intact through the line filter (a URL with
        // digits keeps a standalone image alive) but drop any title.
        .add_handler(vec!["img"], |el: Element| {
            let attr = |name: &str| {
                el.attrs
                    .iter()
                    .find(|a| a.name.local.as_ref() == name)
                    .map(|a| a.value.to_string())
                    .unwrap_or_default()
            };
            Some(format!("![{}]({})", attr("alt"), attr("src")))
        })
        .build()
}

/// Convert raw page markup to filtered Markdown.
///
/// Returns `None` when conversion fails; extraction is best-effort and
/// failures are expected on hostile pages. The output is wrapped in
/// `[Start of page]` / `[End of page]` markers and truncated to
/// [`MAX_EXTRACT_CHARS`].
pub fn page_to_markdown(html: &str) -> Option<String> {
    let markdown = converter().convert(html).ok()?;

    let mut kept = Vec::new();
    for line in markdown.lines() {
        let stripped = line.trim();
        if stripped.is_empty() {
            continue;
        }
        let line = match stripped.strip_prefix("* ") {
            Some(rest) => format!("• {rest}"),
            None => stripped.to_string(),
        };
        if !is_sentence(&line) {
            continue;
        }
        kept.push(line.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    // Only after filtering do images collapse into bracketed alt-text
    // placeholders.
    let joined = kept.join("\n\n");
    let image = Regex::new(r"!\[(.*?)\]\(.*?\)").ok()?;
    let joined = image.replace_all(&joined, "[IMAGE: $1]");

    let result = format!("{PAGE_START}\n\n{joined}\n\n{PAGE_END}");
    Some(result.chars().take(MAX_EXTRACT_CHARS).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentence_truth_table() {
        assert!(is_sentence("Hello world how are you today"));
        assert!(!is_sentence("OK"));
        assert!(is_sentence("Price: 42"));
        assert!(!is_sentence("Done."));
        assert!(!is_sentence("Sign in"));
        assert!(is_sentence("错误代码 500 请稍后再试"));
    }

    #[test]
    fn sentence_ignores_surrounding_whitespace() {
        assert!(is_sentence("  the quick brown fox jumps  "));
    }

    #[test]
    fn extraction_keeps_prose_and_drops_chrome() {
        let html = r#"
            <html><head><title>Shop</title><script>var x = 1;</script></head>
            <body>
              <nav>Home</nav>
              <p>This product ships within five business days.</p>
              <button>Buy</button>
            </body></html>
        "#;
        let text = page_to_markdown(html).unwrap();
        assert!(text.contains("This product ships within five business days."));
        assert!(!text.contains("var x"));
        assert!(!text.contains("Shop"));
        // Single-word chrome fails the sentence filter.
        assert!(!text.contains("Home"));
        assert!(!text.contains("Buy"));
    }

    #[test]
    fn extraction_is_enveloped() {
        let text = page_to_markdown("<body><p>Plenty of words make a sentence here.</p></body>")
            .unwrap();
        assert!(text.starts_with("[Start of page]"));
        assert!(text.ends_with("[End of page]"));
    }

    #[test]
    fn anchors_lose_their_targets() {
        let html = r#"<body><p>Read the full story about yesterday in
            <a href="https://example.com/a/b">our complete coverage section</a>.</p></body>"#;
        let text = page_to_markdown(html).unwrap();
        assert!(text.contains("our complete coverage section"));
        assert!(!text.contains("example.com"));
    }

    #[test]
    fn images_become_alt_placeholders() {
        let html = r#"<body><p>Figure 1 shows the annual trend below
            <img src="/chart.png" alt="sales chart" title="ignored"></p></body>"#;
        let text = page_to_markdown(html).unwrap();
        assert!(text.contains("[IMAGE: sales chart]"));
        assert!(!text.contains("chart.png"));
        assert!(!text.contains("ignored"));
    }

    #[test]
    fn standalone_images_survive_on_their_url_digits() {
        // Before the placeholder rewrite the line is `![logo](/banner123.png)`,
        // which the digits keep past the sentence filter.
        let html = r#"<body><p><img src="/banner123.png" alt="logo"></p></body>"#;
        let text = page_to_markdown(html).unwrap();
        assert!(text.contains("[IMAGE: logo]"));
        assert!(!text.contains("banner123"));
    }

    #[test]
    fn bullets_use_the_dot_glyph() {
        let html = "<body><ul><li>First important item costs 42 dollars</li></ul></body>";
        let text = page_to_markdown(html).unwrap();
        assert!(text.contains("• First important item costs 42 dollars"));
    }

    #[test]
    fn output_never_exceeds_the_cap() {
        let paragraph = "<p>Row 9 repeats this fairly long sentence about nothing at all.</p>";
        let html = format!("<body>{}</body>", paragraph.repeat(500));
        let text = page_to_markdown(&html).unwrap();
        assert!(text.chars().count() <= MAX_EXTRACT_CHARS);
        assert!(text.starts_with("[Start of page]"));
    }
}
