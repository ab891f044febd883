//! Keyword-overlap product matcher.
//!
//! A query is split on whitespace and commas and lower-cased. A product's
//! score is the number of query tokens that occur as substrings of its
//! lower-cased `title`, `product_type`, and `tags`. Only matchable products
//! (non-draft, positive summed inventory) are considered.

use serde::Serialize;

use crate::description::normalize_description;
use crate::products::Product;

/// The winning product and its score.
#[derive(Debug, Clone, Copy)]
pub struct ScoredMatch<'a> {
    pub product: &'a Product,
    pub score: usize,
}

/// Client-facing view of a matched product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub id: String,
    pub title: String,
    /// `body_html` with tags stripped and entities decoded.
    pub description: String,
    pub image: Option<String>,
    pub tags: String,
    pub product_type: Option<String>,
    /// e.g. `"$24.00"`; `None` when the product has no variants.
    pub price_display: Option<String>,
}

impl From<&Product> for MatchResult {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            description: product
                .body_html
                .as_deref()
                .map(normalize_description)
                .unwrap_or_default(),
            image: product.primary_image_src().map(str::to_owned),
            tags: product.tags.clone(),
            product_type: product.product_type.clone(),
            price_display: product.purchase_variant().map(|v| format!("${}", v.price)),
        }
    }
}

/// Splits a query into lower-cased tokens on whitespace and commas.
///
/// An empty or separator-only query yields no tokens.
#[must_use]
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Lower-cased text the tokens are searched in.
fn searchable_text(product: &Product) -> String {
    format!(
        "{} {} {}",
        product.title,
        product.product_type.as_deref().unwrap_or(""),
        product.tags
    )
    .to_lowercase()
}

/// Number of `tokens` found as substrings of the product's searchable text.
#[must_use]
pub fn score(product: &Product, tokens: &[String]) -> usize {
    let haystack = searchable_text(product);
    tokens
        .iter()
        .filter(|t| haystack.contains(t.as_str()))
        .count()
}

/// Returns the highest-scoring matchable product for `query`.
///
/// Ties go to the earliest product in iteration order. With an empty query
/// every candidate scores 0, so the first matchable product wins. Returns
/// `None` only when there are no matchable products.
pub fn best_match<'a, I>(products: I, query: &str) -> Option<ScoredMatch<'a>>
where
    I: IntoIterator<Item = &'a Product>,
{
    let tokens = tokenize(query);
    let mut best: Option<ScoredMatch<'a>> = None;

    for product in products.into_iter().filter(|p| p.is_matchable()) {
        let candidate = score(product, &tokens);
        if best.is_none_or(|b| candidate > b.score) {
            best = Some(ScoredMatch {
                product,
                score: candidate,
            });
        }
    }

    best
}
