//! Structured statement record produced by the extraction engine.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of a child in the caller's own store.
pub type ChildId = i64;

/// Structured data recovered from one billing statement.
///
/// Every field has an empty/zero default so a partially readable document
/// still yields a usable record. Money fields are exact 2-place decimals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedInvoiceRecord {
    /// Invoice/statement reference (e.g. `78352`).
    pub invoice_reference: String,

    /// Child name in per-word title case.
    pub child_name: String,

    /// Child reference token, uppercase alphanumeric.
    pub child_reference: String,

    /// Date the statement was issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,

    /// Payment due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// First day of the billed period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_start: Option<NaiveDate>,

    /// Last day of the billed period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_end: Option<NaiveDate>,

    /// Fee before any discount.
    pub original_amount: Decimal,

    /// Discount percentage in [0, 100], exactly as printed.
    pub discount_percentage: Decimal,

    /// Discount magnitude (stored positive).
    pub discount_amount: Decimal,

    /// Balance carried from a prior period, stored as a magnitude.
    pub previous_balance: Decimal,

    /// Amount for the current period only (`original - discount`). Stays
    /// zero when the discount exceeds the original amount.
    pub week_amount_due: Decimal,

    /// Amount due including the previous balance.
    pub total_amount_due: Decimal,

    /// Legacy alias of `total_amount_due` for older consumers.
    pub amount_due: Decimal,

    /// Fee label, e.g. `Under 3 Fee`.
    pub fee_type: String,

    /// Provider name as printed on the statement.
    pub provider_name: String,

    /// Child id from the caller's roster, when matching succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_child_id: Option<ChildId>,

    /// Which strategy produced each populated field.
    pub trace: Vec<FieldTrace>,
}

impl ExtractedInvoiceRecord {
    /// Name of the strategy that produced `field`, if it was populated.
    pub fn strategy_for(&self, field: RecordField) -> Option<&str> {
        self.trace
            .iter()
            .find(|t| t.field == field)
            .map(|t| t.strategy.as_str())
    }

    pub(crate) fn record_trace(&mut self, field: RecordField, strategy: &str, confidence: f32) {
        self.trace.push(FieldTrace {
            field,
            strategy: strategy.to_string(),
            confidence,
        });
    }
}

/// Record fields that can carry a strategy trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    InvoiceReference,
    ChildName,
    ChildReference,
    IssueDate,
    DueDate,
    PeriodStart,
    PeriodEnd,
    FeeType,
    ProviderName,
    PreviousBalance,
    OriginalAmount,
    DiscountPercentage,
    DiscountAmount,
    WeekAmountDue,
    TotalAmountDue,
    MatchedChild,
}

impl RecordField {
    /// Field name as it appears in serialized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvoiceReference => "invoice_reference",
            Self::ChildName => "child_name",
            Self::ChildReference => "child_reference",
            Self::IssueDate => "issue_date",
            Self::DueDate => "due_date",
            Self::PeriodStart => "period_start",
            Self::PeriodEnd => "period_end",
            Self::FeeType => "fee_type",
            Self::ProviderName => "provider_name",
            Self::PreviousBalance => "previous_balance",
            Self::OriginalAmount => "original_amount",
            Self::DiscountPercentage => "discount_percentage",
            Self::DiscountAmount => "discount_amount",
            Self::WeekAmountDue => "week_amount_due",
            Self::TotalAmountDue => "total_amount_due",
            Self::MatchedChild => "matched_child_id",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic entry naming the strategy that resolved a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldTrace {
    /// Field that was populated.
    pub field: RecordField,
    /// Strategy name, e.g. `statement_heading` or `largest_amount`.
    pub strategy: String,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
}

/// Category of an extraction warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    EmptyText,
    TextTruncated,
    MissingInvoiceReference,
    MalformedInvoiceReference,
    MissingAmountDue,
    TotalFromLargestAmount,
    DiscountMismatch,
    TotalMismatch,
    DiscountExceedsOriginal,
    MissingChildIdentity,
    ChildAutoSelected,
    ChildNotMatched,
}

/// Non-fatal issue noticed during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionWarning {
    pub kind: WarningKind,
    pub message: String,
}

impl ExtractionWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A child known to the caller, used as a matching candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownChild {
    pub id: ChildId,
    pub name: String,
    pub reference_number: String,
}

impl KnownChild {
    pub fn new(id: ChildId, name: impl Into<String>, reference_number: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            reference_number: reference_number.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_without_missing_dates() {
        let record = ExtractedInvoiceRecord {
            invoice_reference: "78352".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["invoice_reference"], "78352");
        assert!(json.get("issue_date").is_none());
        assert!(json.get("matched_child_id").is_none());
    }

    #[test]
    fn test_strategy_lookup() {
        let mut record = ExtractedInvoiceRecord::default();
        record.record_trace(RecordField::ChildName, "statement_heading", 0.9);

        assert_eq!(record.strategy_for(RecordField::ChildName), Some("statement_heading"));
        assert_eq!(record.strategy_for(RecordField::ChildReference), None);
    }

    #[test]
    fn test_known_child_from_json() {
        let json = r#"[{"id": 1, "name": "Sofia Green", "reference_number": "SG300"}]"#;
        let children: Vec<KnownChild> = serde_json::from_str(json).unwrap();

        assert_eq!(children, vec![KnownChild::new(1, "Sofia Green", "SG300")]);
    }

    #[test]
    fn test_warning_kind_serialization() {
        let warning = ExtractionWarning::new(WarningKind::ChildAutoSelected, "auto-selected");
        let json = serde_json::to_value(&warning).unwrap();

        assert_eq!(json["kind"], "child_auto_selected");
        assert_eq!(warning.to_string(), "auto-selected");
    }
}
