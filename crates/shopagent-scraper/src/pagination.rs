//! Cursor pagination for the Shopify Admin REST API.
//!
//! Each `products.json` response carries a `Link` header with the URLs of the
//! adjacent pages; the cursor is the `page_info` query parameter:
//!
//! ```text
//! <https://shop.myshopify.com/admin/api/2024-10/products.json?limit=250&page_info=PREV>; rel="previous",
//! <https://shop.myshopify.com/admin/api/2024-10/products.json?limit=250&page_info=NEXT>; rel="next"
//! ```

use reqwest::Url;

/// One `<url>; rel="…"` entry of a `Link` header.
#[derive(Debug, PartialEq, Eq)]
struct LinkEntry<'a> {
    url: &'a str,
    rel: &'a str,
}

fn parse_entry(raw: &str) -> Option<LinkEntry<'_>> {
    let mut parts = raw.split(';').map(str::trim);
    let url = parts.next()?.strip_prefix('<')?.strip_suffix('>')?;
    let rel = parts.find_map(|p| {
        p.strip_prefix("rel=")
            .map(|value| value.trim_matches('"'))
    })?;
    Some(LinkEntry { url, rel })
}

/// Returns the `page_info` cursor of the `rel="next"` link, if any.
///
/// `None` means the current page is the last one: no header, no next link,
/// or a next link without a `page_info` parameter.
#[must_use]
pub fn next_page_info(link_header: Option<&str>) -> Option<String> {
    let next = link_header?
        .split(',')
        .filter_map(parse_entry)
        .find(|entry| entry.rel == "next")?;

    Url::parse(next.url)
        .ok()?
        .query_pairs()
        .find(|(key, _)| key == "page_info")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
