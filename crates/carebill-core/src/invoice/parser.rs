//! Extraction pipeline: sanitize, resolve, reconcile, match.

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::record::{
    ExtractedInvoiceRecord, ExtractionWarning, KnownChild, RecordField, WarningKind,
};

use super::matcher::match_child;
use super::rules::{
    extract_financials, reconcile, resolve_fields, validate_invoice_reference, ExtractionMatch,
};
use super::sanitize::sanitize_with_limit;
use super::StatementExtractor;

/// Result of statement extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionResult {
    /// Extracted record; unresolved fields keep their defaults.
    pub record: ExtractedInvoiceRecord,
    /// Extraction warnings, in the order they were raised.
    pub warnings: Vec<ExtractionWarning>,
}

impl ExtractionResult {
    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }
}

/// Rule-based statement parser.
///
/// Holds no mutable state; one parser can serve any number of threads.
#[derive(Debug, Clone)]
pub struct StatementParser {
    /// Character cap passed to the sanitizer.
    max_text_length: usize,
    /// Keywords identifying the provider heading.
    provider_keywords: Vec<String>,
    /// Leading non-empty lines scanned for the provider heading.
    provider_scan_lines: usize,
    /// Select a lone known child when no rule matches.
    auto_select_only_child: bool,
}

impl StatementParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            max_text_length: config.max_text_length,
            provider_keywords: config.provider_keywords.clone(),
            provider_scan_lines: config.provider_scan_lines,
            auto_select_only_child: config.auto_select_only_child,
        }
    }

    /// Set the sanitizer's character cap.
    pub fn with_max_text_length(mut self, max: usize) -> Self {
        self.max_text_length = max;
        self
    }

    /// Replace the provider keywords.
    pub fn with_provider_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.provider_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_provider_scan_lines(mut self, lines: usize) -> Self {
        self.provider_scan_lines = lines;
        self
    }

    pub fn with_auto_select_only_child(mut self, enabled: bool) -> Self {
        self.auto_select_only_child = enabled;
        self
    }

    /// Extract a record from raw document text.
    ///
    /// Never fails: missing fields stay at their defaults and every problem
    /// is reported as a warning.
    pub fn extract(&self, raw_text: &str, known_children: &[KnownChild]) -> ExtractionResult {
        let mut record = ExtractedInvoiceRecord::default();
        let mut warnings = Vec::new();

        info!(
            "Extracting statement from {} characters of text ({} known children)",
            raw_text.len(),
            known_children.len()
        );

        let sanitized = sanitize_with_limit(raw_text, self.max_text_length);
        if sanitized.truncated {
            warnings.push(ExtractionWarning::new(
                WarningKind::TextTruncated,
                format!("Text truncated to {} characters", self.max_text_length),
            ));
        }

        let text = sanitized.text.as_str();
        if text.trim().is_empty() {
            warnings.push(ExtractionWarning::new(
                WarningKind::EmptyText,
                "No text could be extracted from the document",
            ));
            return ExtractionResult { record, warnings };
        }

        // Identity, dates and labels
        let fields = resolve_fields(text, &self.provider_keywords, self.provider_scan_lines);

        record.invoice_reference =
            resolved(&mut record, RecordField::InvoiceReference, fields.invoice_reference)
                .unwrap_or_default();
        record.child_name =
            resolved(&mut record, RecordField::ChildName, fields.child_name).unwrap_or_default();
        record.child_reference =
            resolved(&mut record, RecordField::ChildReference, fields.child_reference)
                .unwrap_or_default();
        record.issue_date = resolved(&mut record, RecordField::IssueDate, fields.issue_date);
        record.due_date = resolved(&mut record, RecordField::DueDate, fields.due_date);
        record.period_start = resolved(&mut record, RecordField::PeriodStart, fields.period_start);
        record.period_end = resolved(&mut record, RecordField::PeriodEnd, fields.period_end);
        record.fee_type =
            resolved(&mut record, RecordField::FeeType, fields.fee_type).unwrap_or_default();
        record.provider_name =
            resolved(&mut record, RecordField::ProviderName, fields.provider_name)
                .unwrap_or_default();

        if record.invoice_reference.is_empty() {
            warnings.push(ExtractionWarning::new(
                WarningKind::MissingInvoiceReference,
                "Could not extract invoice reference",
            ));
        } else if !validate_invoice_reference(&record.invoice_reference) {
            warnings.push(ExtractionWarning::new(
                WarningKind::MalformedInvoiceReference,
                format!("Invoice reference '{}' looks malformed", record.invoice_reference),
            ));
        }

        // Money
        let fee_marker = (!record.fee_type.is_empty()).then_some(record.fee_type.as_str());
        let breakdown = extract_financials(text, fee_marker);
        let reconciliation = reconcile(breakdown);
        let breakdown = reconciliation.breakdown;

        if breakdown
            .total_amount_due
            .as_ref()
            .is_some_and(|m| m.strategy == "largest_amount")
        {
            warnings.push(ExtractionWarning::new(
                WarningKind::TotalFromLargestAmount,
                "No labeled total found; using the largest dollar amount",
            ));
        }

        record.previous_balance = money(&mut record, RecordField::PreviousBalance, breakdown.previous_balance);
        record.original_amount = money(&mut record, RecordField::OriginalAmount, breakdown.original_amount);
        record.discount_percentage =
            money(&mut record, RecordField::DiscountPercentage, breakdown.discount_percentage);
        record.discount_amount = money(&mut record, RecordField::DiscountAmount, breakdown.discount_amount);
        record.week_amount_due = money(&mut record, RecordField::WeekAmountDue, reconciliation.week_amount_due);
        record.total_amount_due = money(&mut record, RecordField::TotalAmountDue, breakdown.total_amount_due);
        record.amount_due = reconciliation.amount_due;

        warnings.extend(reconciliation.warnings);

        if record.amount_due.is_zero() {
            warnings.push(ExtractionWarning::new(
                WarningKind::MissingAmountDue,
                "Could not extract amount due",
            ));
        }

        // Child
        let reference = (!record.child_reference.is_empty()).then_some(record.child_reference.as_str());
        let name = (!record.child_name.is_empty()).then_some(record.child_name.as_str());

        if reference.is_none() && name.is_none() {
            warnings.push(ExtractionWarning::new(
                WarningKind::MissingChildIdentity,
                "No child reference or name found; child matching skipped",
            ));
        } else {
            let matched = match_child(reference, name, known_children, self.auto_select_only_child);
            if let (Some(id), Some(strategy)) = (matched.child_id, matched.strategy) {
                debug!(child_id = id, strategy = strategy.as_str(), "Matched child");
                record.record_trace(RecordField::MatchedChild, strategy.as_str(), strategy.confidence());
                record.matched_child_id = Some(id);
            }
            warnings.extend(matched.warning);
        }

        info!(
            "Extracted statement {} with {} fields and {} warnings",
            if record.invoice_reference.is_empty() {
                "<unknown>"
            } else {
                record.invoice_reference.as_str()
            },
            record.trace.len(),
            warnings.len()
        );

        ExtractionResult { record, warnings }
    }
}

impl Default for StatementParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementExtractor for StatementParser {
    fn extract(&self, raw_text: &str, known_children: &[KnownChild]) -> ExtractionResult {
        StatementParser::extract(self, raw_text, known_children)
    }
}

/// Extract with default settings.
pub fn extract(raw_text: &str, known_children: &[KnownChild]) -> ExtractionResult {
    StatementParser::new().extract(raw_text, known_children)
}

/// Record the trace for a resolved field and hand back its value.
fn resolved<T>(
    record: &mut ExtractedInvoiceRecord,
    field: RecordField,
    found: Option<ExtractionMatch<T>>,
) -> Option<T> {
    let found = found?;
    debug!(
        field = field.as_str(),
        strategy = found.strategy,
        source = %found.source,
        "Resolved field"
    );
    record.record_trace(field, found.strategy, found.confidence);
    Some(found.value)
}

fn money(
    record: &mut ExtractedInvoiceRecord,
    field: RecordField,
    found: Option<ExtractionMatch<Decimal>>,
) -> Decimal {
    resolved(record, field, found).unwrap_or(Decimal::ZERO)
}
