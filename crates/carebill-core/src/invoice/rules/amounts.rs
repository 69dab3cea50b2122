//! Money extraction and formatting.
//!
//! All amounts are `rust_decimal::Decimal`; nothing here goes through
//! binary floating point.

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use super::patterns::{DOLLAR_AMOUNT, MONEY};
use super::{ExtractionMatch, FieldExtractor};

/// Money extractor over a configurable pattern.
///
/// The pattern's first capture group holds the amount; without one the whole
/// match is used.
pub struct MoneyExtractor<'a> {
    pattern: &'a Regex,
}

impl MoneyExtractor<'static> {
    pub fn new() -> Self {
        Self { pattern: &MONEY }
    }
}

impl<'a> MoneyExtractor<'a> {
    pub fn with_pattern(pattern: &'a Regex) -> Self {
        Self { pattern }
    }
}

impl Default for MoneyExtractor<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for MoneyExtractor<'_> {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                let raw = caps.get(1).unwrap_or(full);
                let amount = parse_money(raw.as_str())?;
                Some(ExtractionMatch::new(amount, "money", 0.8, full.as_str()))
            })
            .collect()
    }
}

/// First money amount in `text`, using `pattern` or the default
/// `$1,234.56` form (dollar sign optional).
pub fn find_money(text: &str, pattern: Option<&Regex>) -> Option<Decimal> {
    let extractor = match pattern {
        Some(p) => MoneyExtractor::with_pattern(p),
        None => MoneyExtractor::new(),
    };
    extractor.extract(text).map(|m| m.value)
}

/// Every default-pattern amount in `text`, in order of appearance.
pub fn find_all_money(text: &str) -> Vec<Decimal> {
    MoneyExtractor::new()
        .extract_all(text)
        .into_iter()
        .map(|m| m.value)
        .collect()
}

/// Magnitudes of every `$`-prefixed amount in `text`, signed or not.
pub(crate) fn find_dollar_amounts(text: &str) -> Vec<Decimal> {
    DOLLAR_AMOUNT
        .captures_iter(text)
        .filter_map(|caps| parse_money(&caps[2]))
        .collect()
}

/// Parse `$1,234.56`, `1234.56` or `1,234` into a 2-place decimal.
pub fn parse_money(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    Decimal::from_str(&cleaned).ok().map(to_money)
}

/// Round half away from zero to cents and fix the scale at 2.
pub(crate) fn to_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Exact discount for a percentage; zero when the percentage is outside
/// [0, 100].
pub fn calculate_discount_amount(original_amount: Decimal, discount_percentage: Decimal) -> Decimal {
    if discount_percentage < Decimal::ZERO || discount_percentage > Decimal::ONE_HUNDRED {
        return Decimal::ZERO;
    }

    original_amount * discount_percentage / Decimal::ONE_HUNDRED
}

/// Format an amount as `$1,234.56`.
pub fn format_currency(amount: Decimal) -> String {
    let s = format!("{:.2}", to_money(amount).abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{}${}.{}", sign, formatted, decimal_part)
}
