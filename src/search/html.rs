//! HTML to plain text reduction for fetched pages.

use once_cell::sync::Lazy;
use regex::Regex;

/// Script, style, and other non-content blocks.
static NON_CONTENT: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?is)<(script|style|noscript|template|svg|head)\b[^>]*>.*?</(script|style|noscript|template|svg|head)\s*>",
    )
    .ok()
});

static COMMENTS: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").ok());

static TAGS: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"<[^>]*>").ok());

static WHITESPACE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\s+").ok());

fn replace_all(pattern: &Lazy<Option<Regex>>, text: &str, replacement: &str) -> String {
    pattern.as_ref().map_or_else(
        || text.to_string(),
        |re| re.replace_all(text, replacement).into_owned(),
    )
}

/// Extracts readable text from an HTML document.
///
/// Drops scripts, styles, comments and markup, decodes common entities, and
/// collapses runs of whitespace to single spaces.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let without_blocks = replace_all(&NON_CONTENT, html, " ");
    let without_comments = replace_all(&COMMENTS, &without_blocks, " ");
    let without_tags = replace_all(&TAGS, &without_comments, " ");
    let decoded = decode_entities(&without_tags);
    replace_all(&WHITESPACE, decoded.trim(), " ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_markup_and_scripts() {
        let html = r#"<html><head><title>T</title><style>body { color: red; }</style></head>
<body><!-- nav --><script type="text/javascript">var x = "<p>";</script>
<h1>What is phishing?</h1>
<p>Phishing is a <b>social engineering</b> attack.</p></body></html>"#;
        assert_eq!(
            html_to_text(html),
            "What is phishing? Phishing is a social engineering attack."
        );
    }

    #[test]
    fn test_decodes_entities() {
        assert_eq!(
            html_to_text("<p>Tom &amp; Jerry&nbsp;&lt;3 &quot;cheese&quot;</p>"),
            "Tom & Jerry <3 \"cheese\""
        );
    }

    #[test]
    fn test_plain_text_passthrough() {
        assert_eq!(html_to_text("  just\n\ntext  "), "just text");
        assert_eq!(html_to_text(""), "");
    }
}
