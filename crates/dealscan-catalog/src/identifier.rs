//! Catalog identifier (ASIN) extraction from listing URLs.

use std::sync::LazyLock;

use regex::Regex;

/// Product path forms: `/dp/X`, `/gp/product/X`, `/gp/aw/d/X`,
/// `/gp/offer-listing/X`. The first 10 alphanumerics after the prefix are
/// taken, whatever follows them.
static PRODUCT_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/(?:dp|gp/product|gp/aw/d|gp/offer-listing)/([a-z0-9]{10})")
        .expect("valid product path regex")
});

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{10}$").expect("valid identifier regex"));

/// Length of a catalog identifier.
pub const IDENTIFIER_LEN: usize = 10;

/// Extracts the canonical (uppercase) 10-character identifier from a listing
/// URL, or `None` when no rule matches.
///
/// Rules, first match wins:
/// 1. a product path form (`/dp/…`, `/gp/product/…`, `/gp/aw/d/…`,
///    `/gp/offer-listing/…`)
/// 2. any path segment that is exactly 10 alphanumeric characters
/// 3. an `asin` query parameter (name matched case-insensitively)
///
/// When the input does not parse as a URL at all, rule 1 is applied to the
/// raw text instead.
#[must_use]
pub fn extract_identifier(reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    let Ok(url) = reqwest::Url::parse(reference) else {
        return match_product_path(reference);
    };

    if let Some(id) = match_product_path(url.path()) {
        return Some(id);
    }

    if let Some(id) = url
        .path_segments()
        .into_iter()
        .flatten()
        .find(|segment| is_bare_identifier(segment))
    {
        return Some(id.to_ascii_uppercase());
    }

    url.query_pairs()
        .filter(|(name, _)| name.eq_ignore_ascii_case("asin"))
        .map(|(_, value)| value.trim().to_ascii_uppercase())
        .find(|value| IDENTIFIER_RE.is_match(value))
}

fn match_product_path(text: &str) -> Option<String> {
    PRODUCT_PATH_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_uppercase())
}

fn is_bare_identifier(segment: &str) -> bool {
    segment.len() == IDENTIFIER_LEN && segment.bytes().all(|b| b.is_ascii_alphanumeric())
}
