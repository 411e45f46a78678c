//! Price normalization from the three shapes providers and pages emit:
//! free text, major-unit numbers and minor-unit (cent) integers.

use std::str::FromStr;

use dealscan_core::round_currency;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

/// Parses free-text prices such as `"$1,299.99"` or `"EUR 12.50"`.
///
/// Everything except digits, `.` and `,` is dropped, then `,` is removed as
/// a thousands separator. Text that leaves no parseable number yields `None`.
#[must_use]
pub fn parse_price_text(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok().map(round_currency)
}

/// Converts a price already expressed in currency units.
///
/// Non-finite, zero and negative values are rejected; like the minor-unit
/// form, a zero amount means "no offer".
#[must_use]
pub fn price_from_major_units(amount: f64) -> Option<Decimal> {
    if !amount.is_finite() || amount <= 0.0 {
        return None;
    }
    Decimal::from_f64(amount).map(round_currency)
}

/// Converts a minor-unit amount (cents). Zero and negative amounts are not
/// valid prices; providers use them to mean "no offer".
#[must_use]
pub fn price_from_minor_units(cents: i64) -> Option<Decimal> {
    if cents <= 0 {
        return None;
    }
    Some(round_currency(Decimal::new(cents, 2)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn parse_price_text_strips_symbols_and_separators() {
        assert_eq!(parse_price_text("$1,299.99"), Some(dec("1299.99")));
        assert_eq!(parse_price_text("EUR 12.50"), Some(dec("12.50")));
        assert_eq!(parse_price_text("  19 "), Some(dec("19")));
    }

    #[test]
    fn parse_price_text_rounds_to_two_places() {
        assert_eq!(parse_price_text("4.255"), Some(dec("4.26")));
    }

    #[test]
    fn parse_price_text_rejects_text_without_a_number() {
        assert_eq!(parse_price_text("Currently unavailable"), None);
        assert_eq!(parse_price_text(""), None);
        assert_eq!(parse_price_text("1.2.3"), None);
    }

    #[test]
    fn parse_price_text_never_returns_negative() {
        assert_eq!(parse_price_text("-5.00"), Some(dec("5.00")));
    }

    #[test]
    fn parse_price_text_is_idempotent() {
        for input in ["$1,299.99", "12.345", "7", "0.10"] {
            let once = parse_price_text(input).unwrap();
            let twice = parse_price_text(&once.to_string()).unwrap();
            assert_eq!(once, twice, "not idempotent for {input}");
        }
    }

    #[test]
    fn major_units_rejects_non_finite_zero_and_negative() {
        assert_eq!(price_from_major_units(f64::NAN), None);
        assert_eq!(price_from_major_units(0.0), None);
        assert_eq!(price_from_major_units(f64::INFINITY), None);
        assert_eq!(price_from_major_units(-1.0), None);
        assert_eq!(price_from_major_units(24.99), Some(dec("24.99")));
    }

    #[test]
    fn minor_units_divides_by_one_hundred() {
        assert_eq!(price_from_minor_units(2_499), Some(dec("24.99")));
        assert_eq!(price_from_minor_units(5), Some(dec("0.05")));
    }

    #[test]
    fn minor_units_rejects_zero_and_negative() {
        assert_eq!(price_from_minor_units(0), None);
        assert_eq!(price_from_minor_units(-1), None);
    }
}
