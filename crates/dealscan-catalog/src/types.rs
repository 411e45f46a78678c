//! Raw provider response shapes.
//!
//! These mirror the wire format of each provider and nothing more; mapping
//! into [`dealscan_core::DealRecord`] happens in [`crate::normalize`].
//!
//! ## Signed API (`GetItems`)
//! PascalCase JSON. Items the API could not resolve are absent from
//! `ItemsResult.Items` and listed under `Errors` instead. Prices are
//! major-unit decimals (`Amount: 24.99`). `SavingBasis` (the strike-through
//! price) is only present when the listing is discounted.
//!
//! ## Keyed API (`/product`)
//! camelCase JSON. With `stats` requested, `stats.current` and `stats.avg90`
//! are arrays indexed by price type, in cents, with `-1` meaning "no data".

use serde::Deserialize;

/// One raw item from either provider.
#[derive(Debug, Clone)]
pub enum RawItem {
    Paapi(PaapiItem),
    Keepa(KeepaProduct),
}

impl RawItem {
    /// Identifier exactly as the provider returned it.
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            RawItem::Paapi(item) => &item.asin,
            RawItem::Keepa(product) => &product.asin,
        }
    }
}

// ---------------------------------------------------------------------------
// Signed API
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaapiGetItemsResponse {
    #[serde(default)]
    pub items_result: Option<PaapiItemsResult>,
    /// Per-item failures, e.g. `ItemNotAccessible` for delisted identifiers.
    #[serde(default)]
    pub errors: Vec<PaapiItemError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaapiItemsResult {
    #[serde(default)]
    pub items: Vec<PaapiItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaapiItem {
    #[serde(rename = "ASIN")]
    pub asin: String,
    #[serde(rename = "DetailPageURL", default)]
    pub detail_page_url: Option<String>,
    #[serde(default)]
    pub item_info: Option<PaapiItemInfo>,
    #[serde(default)]
    pub images: Option<PaapiImages>,
    #[serde(default)]
    pub offers: Option<PaapiOffers>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaapiItemInfo {
    #[serde(default)]
    pub title: Option<PaapiDisplayValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaapiDisplayValue {
    #[serde(default)]
    pub display_value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaapiImages {
    #[serde(default)]
    pub primary: Option<PaapiImageSet>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaapiImageSet {
    #[serde(default)]
    pub large: Option<PaapiImage>,
    #[serde(default)]
    pub medium: Option<PaapiImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaapiImage {
    #[serde(rename = "URL")]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaapiOffers {
    #[serde(default)]
    pub listings: Vec<PaapiListing>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaapiListing {
    #[serde(default)]
    pub price: Option<PaapiMoney>,
    /// Reference ("was") price; present only for discounted listings.
    #[serde(default)]
    pub saving_basis: Option<PaapiMoney>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaapiMoney {
    #[serde(default)]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaapiItemError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Keyed API
// ---------------------------------------------------------------------------

/// Index of the Amazon-as-seller price in `stats.current`.
pub const KEEPA_PRICE_AMAZON: usize = 0;
/// Index of the lowest marketplace-new price.
pub const KEEPA_PRICE_NEW: usize = 1;
/// Index of the manufacturer list price.
pub const KEEPA_PRICE_LIST: usize = 4;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeepaProductResponse {
    #[serde(default)]
    pub products: Vec<KeepaProduct>,
    #[serde(default)]
    pub tokens_left: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeepaProduct {
    pub asin: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Comma-separated image file names, first is the main image.
    #[serde(rename = "imagesCSV", default)]
    pub images_csv: Option<String>,
    #[serde(default)]
    pub stats: Option<KeepaStats>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeepaStats {
    #[serde(default)]
    pub current: Vec<Option<i64>>,
    #[serde(rename = "avg90", default)]
    pub avg90: Vec<Option<i64>>,
}

impl KeepaStats {
    /// Current price of series `index` in cents, if recorded.
    #[must_use]
    pub fn current_at(&self, index: usize) -> Option<i64> {
        self.current.get(index).copied().flatten()
    }

    #[must_use]
    pub fn avg90_at(&self, index: usize) -> Option<i64> {
        self.avg90.get(index).copied().flatten()
    }
}
