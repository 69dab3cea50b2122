//! Rule-based field resolvers for daycare statements.

pub mod amounts;
pub mod dates;
pub mod fields;
pub mod financial;
pub mod patterns;

pub use amounts::{
    calculate_discount_amount, find_all_money, find_money, format_currency, parse_money,
    MoneyExtractor,
};
pub use dates::{find_date, find_date_match, find_date_with, DateExtractor, DateOrder, DatePattern};
pub use fields::{resolve_fields, title_case, validate_invoice_reference, ResolvedFields};
pub use financial::{extract_financials, reconcile, FinancialBreakdown, Reconciliation};

use regex::Regex;

/// Trait for primitive value extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A resolved value and the strategy that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Name of the strategy that matched.
    pub strategy: &'static str,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, strategy: &'static str, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            strategy,
            confidence,
            source: source.into(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ExtractionMatch<U> {
        ExtractionMatch {
            value: f(self.value),
            strategy: self.strategy,
            confidence: self.confidence,
            source: self.source,
        }
    }
}

/// One entry of an ordered strategy list: a pattern, the capture group that
/// holds the value, and the parser applied to it.
pub struct Strategy<T> {
    pub name: &'static str,
    pub pattern: &'static Regex,
    pub group: usize,
    pub confidence: f32,
    pub parse: fn(&str) -> Option<T>,
}

impl<T> Strategy<T> {
    pub const fn new(
        name: &'static str,
        pattern: &'static Regex,
        group: usize,
        confidence: f32,
        parse: fn(&str) -> Option<T>,
    ) -> Self {
        Self {
            name,
            pattern,
            group,
            confidence,
            parse,
        }
    }

    /// Only the first structural match is considered; a capture that fails
    /// to parse makes the whole strategy miss.
    pub fn apply(&self, text: &str) -> Option<ExtractionMatch<T>> {
        let caps = self.pattern.captures(text)?;
        let captured = caps.get(self.group)?.as_str();
        let value = (self.parse)(captured)?;
        Some(ExtractionMatch::new(value, self.name, self.confidence, &caps[0]))
    }
}

/// Try strategies in order and return the first success.
pub fn first_match<T>(text: &str, strategies: &[Strategy<T>]) -> Option<ExtractionMatch<T>> {
    strategies.iter().find_map(|strategy| strategy.apply(text))
}
