//! Normalization from raw provider items to [`dealscan_core::DealRecord`].
//!
//! Provider-specific field paths and price units live here; the transport
//! clients hand over [`RawItem`] values untouched.

use dealscan_core::{DealRecord, Discount};
use reqwest::Url;
use rust_decimal::Decimal;

use crate::price::{price_from_major_units, price_from_minor_units};
use crate::types::{
    KeepaProduct, PaapiItem, RawItem, KEEPA_PRICE_AMAZON, KEEPA_PRICE_LIST, KEEPA_PRICE_NEW,
};

/// Image CDN base the keyed provider's `imagesCSV` file names are relative to.
pub const KEEPA_IMAGE_BASE: &str = "https://m.media-amazon.com/images/I/";

/// Storefront settings used to build canonical and affiliate links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSettings {
    /// Storefront host, e.g. `www.amazon.com`.
    pub storefront_domain: String,
    pub affiliate_tag: Option<String>,
}

impl LinkSettings {
    /// `https://{storefront}/dp/{identifier}`.
    #[must_use]
    pub fn canonical_link(&self, identifier: &str) -> String {
        format!(
            "https://{}/dp/{identifier}",
            self.storefront_domain.trim_end_matches('/')
        )
    }

    /// Canonical link with `tag=<affiliate tag>` appended when a tag is
    /// configured, the plain canonical link otherwise.
    #[must_use]
    pub fn affiliate_link(&self, identifier: &str) -> String {
        let canonical = self.canonical_link(identifier);
        let Some(tag) = self.affiliate_tag.as_deref() else {
            return canonical;
        };
        match Url::parse(&canonical) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair("tag", tag);
                url.to_string()
            }
            Err(_) => canonical,
        }
    }
}

/// Provider-neutral view of one raw item, before link and discount
/// derivation.
struct Extracted {
    identifier: Option<String>,
    title: Option<String>,
    detail_link: Option<String>,
    image: Option<String>,
    original_price: Option<Decimal>,
    current_price: Option<Decimal>,
}

/// Maps a raw provider item into a [`DealRecord`].
///
/// `reference` is the listing reference the identifier was first registered
/// from; it is used as the link when the provider supplies none.
#[must_use]
pub fn normalize_item(item: RawItem, reference: Option<&str>, links: &LinkSettings) -> DealRecord {
    let extracted = match item {
        RawItem::Paapi(item) => extract_paapi(item),
        RawItem::Keepa(product) => extract_keepa(product),
    };

    let needs_manual_check = DealRecord::is_incomplete(
        extracted.identifier.as_deref(),
        extracted.title.as_deref(),
        extracted.image.as_deref(),
        extracted.original_price,
        extracted.current_price,
    );

    let identifier = extracted.identifier;
    let title = extracted.title.or_else(|| identifier.clone());
    let link = extracted
        .detail_link
        .or_else(|| reference.map(str::to_owned))
        .or_else(|| identifier.as_deref().map(|id| links.canonical_link(id)));
    let affiliate_link = identifier.as_deref().map(|id| links.affiliate_link(id));

    DealRecord {
        identifier,
        title,
        link,
        original_price: extracted.original_price,
        current_price: extracted.current_price,
        image: extracted.image,
        needs_manual_check,
        discount: Discount::compute(extracted.original_price, extracted.current_price),
        affiliate_link,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn canonical_identifier(raw: &str) -> Option<String> {
    non_blank(Some(raw.to_ascii_uppercase()))
}

/// Signed API: prices are major-unit decimals on the first listing;
/// `SavingBasis` is the original price.
fn extract_paapi(item: PaapiItem) -> Extracted {
    let title = non_blank(
        item.item_info
            .and_then(|info| info.title)
            .and_then(|title| title.display_value),
    );

    let image = non_blank(
        item.images
            .and_then(|images| images.primary)
            .and_then(|primary| primary.large.or(primary.medium))
            .map(|image| image.url),
    );

    let listing = item
        .offers
        .and_then(|offers| offers.listings.into_iter().next());
    let (current_price, original_price) = match listing {
        Some(listing) => (
            listing
                .price
                .and_then(|p| p.amount)
                .and_then(price_from_major_units),
            listing
                .saving_basis
                .and_then(|p| p.amount)
                .and_then(price_from_major_units),
        ),
        None => (None, None),
    };

    Extracted {
        identifier: canonical_identifier(&item.asin),
        title,
        detail_link: non_blank(item.detail_page_url),
        image,
        original_price,
        current_price,
    }
}

/// Keyed API: prices are cents in `stats.current` / `stats.avg90`.
///
/// Current is the Amazon price, else the marketplace-new price. Original is
/// the list price, else the 90-day average of whichever series supplied the
/// current price.
fn extract_keepa(product: KeepaProduct) -> Extracted {
    let stats = product.stats.unwrap_or_default();

    let current = [KEEPA_PRICE_AMAZON, KEEPA_PRICE_NEW]
        .into_iter()
        .find_map(|series| {
            stats
                .current_at(series)
                .and_then(price_from_minor_units)
                .map(|price| (series, price))
        });

    let original_price = stats
        .current_at(KEEPA_PRICE_LIST)
        .and_then(price_from_minor_units)
        .or_else(|| {
            current.and_then(|(series, _)| stats.avg90_at(series).and_then(price_from_minor_units))
        });

    let image = product
        .images_csv
        .as_deref()
        .and_then(|csv| csv.split(',').map(str::trim).find(|name| !name.is_empty()))
        .map(|name| format!("{KEEPA_IMAGE_BASE}{name}"));

    Extracted {
        identifier: canonical_identifier(&product.asin),
        title: non_blank(product.title),
        detail_link: None,
        image,
        original_price,
        current_price: current.map(|(_, price)| price),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
