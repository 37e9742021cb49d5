//! Price label parsing.
//!
//! A price only counts as extracted when it parses to a decimal. Labels such
//! as `"See price in cart"` or `"Options from"` are failures for the strategy
//! that produced them, never a string value.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::patterns::{PRICE_CENTS, PRICE_NUMBER};

/// Parse a price label into its canonical decimal form.
///
/// Takes the first number in the label, so ranges (`"$10.00 - $20.00"`) and
/// "now/was" pairs resolve to the first (current) price. When both `.` and
/// `,` appear, the last one is the decimal separator (`"1,299.00"`,
/// `"1.299,00 €"`). A lone comma followed by exactly two digits is a decimal
/// comma (`"12,99 €"`); otherwise a lone separator kind is read as grouping
/// only if every group after the first has three digits. Anything else is
/// not a price.
#[must_use]
pub fn parse_price(label: &str) -> Option<Decimal> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }

    if let Some(cents) = PRICE_CENTS
        .captures(label)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
    {
        return Some(Decimal::new(cents, 2));
    }

    let number = PRICE_NUMBER.find(label)?.as_str();
    let value = Decimal::from_str(&normalize_number(number)?).ok()?;
    if value.is_sign_negative() {
        return None;
    }
    Some(value.normalize())
}

/// Rewrite a matched number with `.` as the only separator.
fn normalize_number(number: &str) -> Option<String> {
    let decimal = match (number.rfind('.'), number.rfind(',')) {
        (Some(dot), Some(comma)) => Some(if dot > comma { '.' } else { ',' }),
        (Some(_), None) => (number.matches('.').count() == 1).then_some('.'),
        (None, Some(_)) => is_decimal_comma(number).then_some(','),
        (None, None) => None,
    };

    let (int_part, frac) = match decimal {
        Some(sep) => number.rsplit_once(sep)?,
        None => (number, ""),
    };
    let digits = ungroup(int_part)?;

    Some(if decimal.is_some() {
        format!("{digits}.{frac}")
    } else {
        digits
    })
}

/// Strip thousands separators, insisting on one separator kind and
/// three-digit groups.
fn ungroup(int_part: &str) -> Option<String> {
    let Some(sep) = int_part.chars().find(|c| *c == '.' || *c == ',') else {
        return Some(int_part.to_string());
    };
    let mut groups = int_part.split(sep);
    let lead = groups.next()?;
    let lead_ok = (1..=3).contains(&lead.len()) && lead.bytes().all(|b| b.is_ascii_digit());
    let rest: Vec<&str> = groups.collect();
    let rest_ok = rest
        .iter()
        .all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()));
    (lead_ok && rest_ok).then(|| std::iter::once(lead).chain(rest).collect())
}

fn is_decimal_comma(number: &str) -> bool {
    number.matches(',').count() == 1
        && number
            .rsplit(',')
            .next()
            .is_some_and(|tail| tail.len() == 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn test_plain_and_currency_prices() {
        assert_eq!(parse_price("$12.34"), Some(dec("12.34")));
        assert_eq!(parse_price("12"), Some(dec("12")));
        assert_eq!(parse_price("Now $1,299.00"), Some(dec("1299")));
        assert_eq!(parse_price("current price $5.97"), Some(dec("5.97")));
    }

    #[test]
    fn test_canonical_form_drops_trailing_zeros() {
        assert_eq!(parse_price("$10.00").map(|d| d.to_string()), Some("10".to_string()));
        assert_eq!(parse_price("49.90").map(|d| d.to_string()), Some("49.9".to_string()));
    }

    #[test]
    fn test_ranges_take_first() {
        assert_eq!(parse_price("$10.00 - $20.00"), Some(dec("10")));
    }

    #[test]
    fn test_decimal_comma() {
        assert_eq!(parse_price("12,99 €"), Some(dec("12.99")));
        assert_eq!(parse_price("1,299"), Some(dec("1299")));
        assert_eq!(parse_price("1,299,000"), Some(dec("1299000")));
        assert_eq!(parse_price("1.299,00 €"), Some(dec("1299")));
        assert_eq!(parse_price("12.345,6"), Some(dec("12345.6")));
        assert_eq!(parse_price("EUR 1.299.000"), Some(dec("1299000")));
    }

    #[test]
    fn test_malformed_grouping_fails() {
        assert_eq!(parse_price("1.2.3"), None);
        assert_eq!(parse_price("12,34,56"), None);
        assert_eq!(parse_price("1,2.50"), None);
    }

    #[test]
    fn test_leading_dot_and_zero() {
        assert_eq!(parse_price(".99"), Some(dec("0.99")));
        assert_eq!(parse_price("$0.00"), Some(dec("0")));
    }

    #[test]
    fn test_cents_labels() {
        assert_eq!(parse_price("97¢"), Some(dec("0.97")));
        assert_eq!(parse_price("50 cents"), Some(dec("0.50")));
    }

    #[test]
    fn test_non_numeric_labels_fail() {
        assert_eq!(parse_price("See price in cart"), None);
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("   "), None);
    }
}
