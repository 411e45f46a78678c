//! The canonical output record and discount arithmetic.
//!
//! Prices are [`Decimal`] values rounded to two places; an unknown price is
//! always `None`, never a sentinel such as `0` or `-1`.

use std::cmp::Ordering;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Rounds a currency amount to two decimal places, half away from zero.
#[must_use]
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Discount derived from an (original, current) price pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    #[serde(rename = "HasDiscount")]
    pub has_discount: bool,
    #[serde(rename = "DiscountPct", with = "rust_decimal::serde::float_option")]
    pub percentage: Option<Decimal>,
    #[serde(rename = "YouSave", with = "rust_decimal::serde::float_option")]
    pub saved_amount: Option<Decimal>,
}

impl Discount {
    /// No discount information: at least one side of the pair is unknown.
    pub const UNKNOWN: Discount = Discount {
        has_discount: false,
        percentage: None,
        saved_amount: None,
    };

    /// Computes the discount of `current` relative to `original`.
    ///
    /// - either price absent: `{false, null, null}`
    /// - `current >= original`: `{false, 0, 0}`
    /// - `current < original`: percentage and saved amount, both rounded to
    ///   two places
    #[must_use]
    pub fn compute(original: Option<Decimal>, current: Option<Decimal>) -> Self {
        let (Some(original), Some(current)) = (original, current) else {
            return Self::UNKNOWN;
        };

        if current >= original {
            return Discount {
                has_discount: false,
                percentage: Some(Decimal::ZERO),
                saved_amount: Some(Decimal::ZERO),
            };
        }

        let saved = original - current;
        // original > current >= 0 here, so the division cannot fail.
        let Some(ratio) = saved.checked_div(original) else {
            return Self::UNKNOWN;
        };

        Discount {
            has_discount: true,
            percentage: Some(round_currency(ratio * Decimal::ONE_HUNDRED)),
            saved_amount: Some(round_currency(saved)),
        }
    }
}

/// One processed identifier, as written to the output JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealRecord {
    #[serde(rename = "ASIN")]
    pub identifier: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Link")]
    pub link: Option<String>,
    #[serde(rename = "Original", with = "rust_decimal::serde::float_option")]
    pub original_price: Option<Decimal>,
    #[serde(rename = "Current", with = "rust_decimal::serde::float_option")]
    pub current_price: Option<Decimal>,
    #[serde(rename = "Image")]
    pub image: Option<String>,
    #[serde(rename = "NeedCheckManually")]
    pub needs_manual_check: bool,
    #[serde(flatten)]
    pub discount: Discount,
    #[serde(rename = "AffiliateLink")]
    pub affiliate_link: Option<String>,
}

impl DealRecord {
    /// `true` when any of title, image, original price, current price or
    /// identifier is missing.
    #[must_use]
    pub fn is_incomplete(
        identifier: Option<&str>,
        title: Option<&str>,
        image: Option<&str>,
        original_price: Option<Decimal>,
        current_price: Option<Decimal>,
    ) -> bool {
        identifier.is_none()
            || title.is_none()
            || image.is_none()
            || original_price.is_none()
            || current_price.is_none()
    }

    /// Discount percentage used for ranking; unknown counts as zero.
    #[must_use]
    pub fn ranking_percentage(&self) -> Decimal {
        self.discount.percentage.unwrap_or(Decimal::ZERO)
    }
}

/// Sorts records by discount percentage, highest first.
///
/// A missing percentage ranks as zero. Among equal effective percentages a
/// known value precedes a missing one; otherwise input order is kept.
pub fn sort_by_discount(records: &mut [DealRecord]) {
    records.sort_by(|a, b| {
        b.ranking_percentage()
            .cmp(&a.ranking_percentage())
            .then_with(|| match (a.discount.percentage, b.discount.percentage) {
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                _ => Ordering::Equal,
            })
    });
}
