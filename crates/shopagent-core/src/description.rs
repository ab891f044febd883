//! Plain-text rendering of Shopify `body_html` descriptions.

use std::sync::OnceLock;

use regex::Regex;

fn tag_regex() -> &'static Regex {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"))
}

/// Strips HTML tags, decodes the common entities, and collapses whitespace.
///
/// `"<p>A &amp; B</p>"` becomes `"A & B"`. Block-level tags are replaced with
/// a space so adjacent paragraphs do not run together.
#[must_use]
pub fn normalize_description(html: &str) -> String {
    let without_tags = tag_regex().replace_all(html, " ");
    let decoded = decode_entities(&without_tags);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `&amp;` is decoded last so `&amp;lt;` yields the literal text `&lt;`.
fn decode_entities(value: &str) -> String {
    value
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
