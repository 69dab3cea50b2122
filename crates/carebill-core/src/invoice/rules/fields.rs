//! Resolvers for the identity, reference, date and label fields.
//!
//! Each resolver is an ordered strategy list evaluated with
//! [`first_match`]; the first structural match that also parses wins.

use chrono::NaiveDate;

use super::dates::find_date;
use super::patterns::*;
use super::{first_match, ExtractionMatch, Strategy};

/// Every non-financial field, each with the strategy that produced it.
#[derive(Debug, Clone, Default)]
pub struct ResolvedFields {
    pub invoice_reference: Option<ExtractionMatch<String>>,
    pub child_name: Option<ExtractionMatch<String>>,
    pub child_reference: Option<ExtractionMatch<String>>,
    pub issue_date: Option<ExtractionMatch<NaiveDate>>,
    pub due_date: Option<ExtractionMatch<NaiveDate>>,
    pub period_start: Option<ExtractionMatch<NaiveDate>>,
    pub period_end: Option<ExtractionMatch<NaiveDate>>,
    pub fee_type: Option<ExtractionMatch<String>>,
    pub provider_name: Option<ExtractionMatch<String>>,
}

/// Run every field resolver over sanitized text.
pub fn resolve_fields(text: &str, provider_keywords: &[String], provider_scan_lines: usize) -> ResolvedFields {
    let upper = text.to_uppercase();

    ResolvedFields {
        invoice_reference: resolve_invoice_reference(&upper),
        child_name: resolve_child_name(&upper),
        child_reference: resolve_child_reference(&upper),
        issue_date: resolve_issue_date(&upper),
        due_date: resolve_due_date(&upper),
        period_start: resolve_period_start(&upper),
        period_end: resolve_period_end(&upper),
        fee_type: resolve_fee_type(text),
        provider_name: resolve_provider_name(text, provider_keywords, provider_scan_lines),
    }
}

/// Invoice reference from uppercased text.
pub fn resolve_invoice_reference(upper: &str) -> Option<ExtractionMatch<String>> {
    let strategies = [
        Strategy::new("inv_number", &INV_NUMBER, 1, 0.95, parse_token),
        Strategy::new("invoice_label", &INVOICE_NUMBER, 1, 0.95, parse_token),
        Strategy::new("reference_label", &REFERENCE_LABELED, 1, 0.7, parse_token),
        Strategy::new("ref_bare", &REF_BARE, 1, 0.6, parse_token),
    ];
    first_match(upper, &strategies)
}

/// Child name from uppercased text, returned in title case.
pub fn resolve_child_name(upper: &str) -> Option<ExtractionMatch<String>> {
    let strategies = [
        Strategy::new("child_name_label", &CHILD_NAME_LABEL, 1, 0.95, parse_name),
        Strategy::new("student_name_label", &STUDENT_NAME_LABEL, 1, 0.95, parse_name),
        Strategy::new("child_label", &CHILD_LABEL, 1, 0.9, parse_name),
        Strategy::new("for_label", &FOR_LABEL, 1, 0.8, parse_name),
        Strategy::new("statement_heading", &STATEMENT_HEADING, 1, 0.9, parse_name),
        Strategy::new("name_label", &NAME_LABEL, 1, 0.7, parse_name),
    ];
    first_match(upper, &strategies)
}

/// Child reference token from uppercased text.
pub fn resolve_child_reference(upper: &str) -> Option<ExtractionMatch<String>> {
    let strategies = [
        Strategy::new("child_ref_label", &CHILD_REF_LABEL, 1, 0.95, parse_token),
        Strategy::new("reference_label", &REFERENCE_COLON, 1, 0.8, parse_token),
        Strategy::new("id_label", &ID_COLON, 1, 0.5, parse_token),
        Strategy::new("statement_heading", &STATEMENT_HEADING_REF, 1, 0.9, parse_token),
        Strategy::new("reference_number", &REFERENCE_NUMBER, 1, 0.7, parse_token),
    ];
    first_match(upper, &strategies)
}

pub fn resolve_issue_date(upper: &str) -> Option<ExtractionMatch<NaiveDate>> {
    let strategies = [
        Strategy::new("issued_label", &ISSUED, 1, 0.95, find_date),
        Strategy::new("issue_date_label", &ISSUE_DATE, 1, 0.95, find_date),
        Strategy::new("invoice_date_label", &INVOICE_DATE, 1, 0.9, find_date),
    ];
    let generic = [Strategy::new("date_label", &DATE_GENERIC, 1, 0.5, find_date)];

    // A bare DATE label must not pick up the date of a DUE DATE label.
    first_match(upper, &strategies).or_else(|| {
        let without_due = DUE_DATE.replace_all(upper, " ");
        first_match(&without_due, &generic)
    })
}

pub fn resolve_due_date(upper: &str) -> Option<ExtractionMatch<NaiveDate>> {
    let strategies = [
        Strategy::new("due_date_label", &DUE_DATE, 1, 0.95, find_date),
        Strategy::new("payment_due_label", &PAYMENT_DUE, 1, 0.8, find_date),
    ];
    first_match(upper, &strategies)
}

pub fn resolve_period_start(upper: &str) -> Option<ExtractionMatch<NaiveDate>> {
    let strategies = [
        Strategy::new("period_range", &PERIOD_RANGE, 1, 0.95, find_date),
        Strategy::new("period_from_label", &PERIOD_FROM, 1, 0.9, find_date),
        Strategy::new("period_label", &PERIOD_SINGLE, 1, 0.8, find_date),
        Strategy::new("from_label", &FROM_GENERIC, 1, 0.5, find_date),
    ];
    first_match(upper, &strategies)
}

pub fn resolve_period_end(upper: &str) -> Option<ExtractionMatch<NaiveDate>> {
    let strategies = [
        Strategy::new("period_range", &PERIOD_RANGE, 2, 0.95, find_date),
        Strategy::new("period_to_label", &PERIOD_TO, 1, 0.9, find_date),
        Strategy::new("to_label", &TO_GENERIC, 1, 0.5, find_date),
    ];
    first_match(upper, &strategies)
}

/// Fee label from sanitized text, original casing kept.
pub fn resolve_fee_type(text: &str) -> Option<ExtractionMatch<String>> {
    let strategies = [
        Strategy::new("under_n_fee", &UNDER_N_FEE, 1, 0.95, parse_label),
        Strategy::new("token_fee", &TOKEN_FEE, 1, 0.7, parse_label),
        Strategy::new("fee_type_label", &FEE_TYPE_LABEL, 1, 0.9, parse_label),
        Strategy::new("service_label", &SERVICE_LABEL, 1, 0.8, parse_label),
    ];
    first_match(text, &strategies)
}

/// Provider name: a heading-like line among the first `scan_lines`
/// non-empty lines that mentions one of `keywords`, else a `From:` label.
pub fn resolve_provider_name(
    text: &str,
    keywords: &[String],
    scan_lines: usize,
) -> Option<ExtractionMatch<String>> {
    let heading = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(scan_lines)
        .find(|line| {
            let upper = line.to_uppercase();
            is_heading_like(line) && keywords.iter().any(|k| upper.contains(&k.to_uppercase()))
        });

    if let Some(line) = heading {
        return parse_label(line).map(|name| ExtractionMatch::new(name, "keyword_heading", 0.8, line));
    }

    let strategies = [Strategy::new("from_label", &FROM_LABEL, 1, 0.6, parse_label)];
    first_match(text, &strategies)
}

/// Short line without a label colon or sentence punctuation.
fn is_heading_like(line: &str) -> bool {
    line.split_whitespace().count() <= 8
        && !line.contains(':')
        && !line.ends_with(['.', ',', ';'])
}

fn parse_token(s: &str) -> Option<String> {
    let token = s.trim();
    (!token.is_empty()).then(|| token.to_uppercase())
}

fn parse_name(s: &str) -> Option<String> {
    let name = title_case(s);
    (!name.is_empty()).then_some(name)
}

fn parse_label(s: &str) -> Option<String> {
    let label = s.split_whitespace().collect::<Vec<_>>().join(" ");
    (!label.is_empty()).then_some(label)
}

/// Per-word title case with collapsed whitespace: `SOFIA  GREEN` → `Sofia Green`.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// At least 3 characters, only letters, digits, `-` and `_`.
pub fn validate_invoice_reference(reference: &str) -> bool {
    let reference = reference.trim();
    reference.chars().count() >= 3
        && reference
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn keywords() -> Vec<String> {
        crate::models::config::default_provider_keywords()
    }

    #[test]
    fn test_invoice_reference_priority() {
        let found = resolve_invoice_reference("REFERENCE: SG300\nFEE INV 78352").unwrap();
        assert_eq!(found.value, "78352");
        assert_eq!(found.strategy, "inv_number");

        let found = resolve_invoice_reference("INVOICE NO: DC-2025_08").unwrap();
        assert_eq!(found.value, "DC-2025_08");

        let found = resolve_invoice_reference("INVOICE #: A123").unwrap();
        assert_eq!(found.value, "A123");

        let found = resolve_invoice_reference("REFERENCE: AB-77").unwrap();
        assert_eq!(found.strategy, "reference_label");
    }

    #[test]
    fn test_ref_bare_needs_digit() {
        assert!(resolve_invoice_reference("ITEM TYPE REF DATE DEBIT").is_none());
        assert_eq!(resolve_invoice_reference("REF 78352").unwrap().value, "78352");
    }

    #[test]
    fn test_child_name_labels() {
        assert_eq!(resolve_child_name("CHILD NAME: MIA  JONES").unwrap().value, "Mia Jones");
        assert_eq!(resolve_child_name("STUDENT NAME: LEO KING").unwrap().value, "Leo King");
        assert_eq!(resolve_child_name("CHILD: ARI LEE\n").unwrap().value, "Ari Lee");
        assert_eq!(resolve_child_name("FOR: NOAH WEST").unwrap().value, "Noah West");
    }

    #[test]
    fn test_child_name_statement_heading() {
        let found = resolve_child_name("STATEMENT FOR SOFIA GREEN-SG300\n").unwrap();
        assert_eq!(found.value, "Sofia Green");
        assert_eq!(found.strategy, "statement_heading");
    }

    #[test]
    fn test_child_name_bounded_before_amount() {
        let found = resolve_child_name("NAME: SOFIA GREEN AMOUNT DUE\n(GST INCL)$166.96").unwrap();
        assert_eq!(found.value, "Sofia Green");
        assert_eq!(found.strategy, "name_label");
    }

    #[test]
    fn test_child_reference_strategies() {
        assert_eq!(resolve_child_reference("CHILD REF: MJ42").unwrap().value, "MJ42");
        assert_eq!(resolve_child_reference("STUDENT ID: 7781").unwrap().value, "7781");
        assert_eq!(resolve_child_reference("REFERENCE: SG300").unwrap().value, "SG300");
        assert_eq!(resolve_child_reference("NO: X1").unwrap().strategy, "id_label");

        let found = resolve_child_reference("STATEMENT FOR SOFIA GREEN-SG300").unwrap();
        assert_eq!(found.value, "SG300");
        assert_eq!(found.strategy, "statement_heading");

        let found = resolve_child_reference("QUOTING YOUR CHILD'S REFERENCE NUMBER SG300").unwrap();
        assert_eq!(found.value, "SG300");
        assert_eq!(found.strategy, "reference_number");
    }

    #[test]
    fn test_issue_date_labels() {
        let found = resolve_issue_date("ISSUED: 25 AUGUST 2025 PERIOD: 25 AUG 2025").unwrap();
        assert_eq!(found.value, date(2025, 8, 25));
        assert_eq!(found.strategy, "issued_label");

        let found = resolve_issue_date("ISSUE DATE: 01/09/2025").unwrap();
        assert_eq!(found.value, date(2025, 9, 1));

        let found = resolve_issue_date("DATE: 2025-09-02").unwrap();
        assert_eq!(found.strategy, "date_label");
    }

    #[test]
    fn test_due_date_is_not_an_issue_date() {
        assert!(resolve_issue_date("DUE DATE: 05/09/2025").is_none());

        let found = resolve_issue_date("DUE DATE: 05/09/2025\nDATE: 29/08/2025").unwrap();
        assert_eq!(found.value, date(2025, 8, 29));
        assert_eq!(found.strategy, "date_label");
    }

    #[test]
    fn test_malformed_date_falls_through() {
        let found = resolve_issue_date("ISSUED: 31/02/2025\nDATE: 03/03/2025").unwrap();
        assert_eq!(found.value, date(2025, 3, 3));
        assert_eq!(found.strategy, "date_label");
    }

    #[test]
    fn test_due_date() {
        assert_eq!(resolve_due_date("DUE DATE: 05/09/2025").unwrap().value, date(2025, 9, 5));
        assert_eq!(resolve_due_date("PAYMENT DUE 2025-09-05").unwrap().value, date(2025, 9, 5));
        assert!(resolve_due_date("AMOUNT DUE $5.00").is_none());
    }

    #[test]
    fn test_period_range_both_sides() {
        let text = "PERIOD: 25 AUG 2025 - 29 AUG 2025";
        assert_eq!(resolve_period_start(text).unwrap().value, date(2025, 8, 25));
        assert_eq!(resolve_period_end(text).unwrap().value, date(2025, 8, 29));
    }

    #[test]
    fn test_period_generic_fallbacks() {
        let text = "FROM: 01/08/2025\nTO: 31/08/2025";
        let start = resolve_period_start(text).unwrap();
        let end = resolve_period_end(text).unwrap();

        assert_eq!(start.value, date(2025, 8, 1));
        assert_eq!(start.strategy, "from_label");
        assert_eq!(end.value, date(2025, 8, 31));
        assert_eq!(end.strategy, "to_label");
    }

    #[test]
    fn test_fee_type_priority() {
        let found = resolve_fee_type("Fee Type: Casual\n1Under 3 Fee May 2025").unwrap();
        assert_eq!(found.value, "Under 3 Fee");

        assert_eq!(resolve_fee_type("Session: 5Day Fee").unwrap().value, "5Day Fee");
        assert_eq!(resolve_fee_type("Fee type: Full Day Care").unwrap().value, "Full Day Care");
        assert_eq!(resolve_fee_type("Service: Kindergarten").unwrap().value, "Kindergarten");
        assert!(resolve_fee_type("payments for fees").is_none());
    }

    #[test]
    fn test_provider_heading() {
        let text = "Tax Invoice\nLittle Acorns Nursery\nStatement for Mia";
        let found = resolve_provider_name(text, &keywords(), 10).unwrap();
        assert_eq!(found.value, "Little Acorns Nursery");
        assert_eq!(found.strategy, "keyword_heading");
    }

    #[test]
    fn test_provider_from_fallback() {
        let text = "Active Explorers Ashburton requires payments for fees to be paid weekly as per our terms.\n\
                    To: Dmitry Green & Erika Green From: Active Explorers Ashburton";
        let found = resolve_provider_name(text, &keywords(), 10).unwrap();
        assert_eq!(found.value, "Active Explorers Ashburton");
        assert_eq!(found.strategy, "from_label");
    }

    #[test]
    fn test_provider_scan_limit() {
        let text = "a\nb\nc\nSunny Daycare";
        assert!(resolve_provider_name(text, &keywords(), 3).is_none());
        assert!(resolve_provider_name(text, &keywords(), 4).is_some());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("SOFIA   GREEN"), "Sofia Green");
        assert_eq!(title_case("o'BRIEN"), "O'brien");
        assert_eq!(title_case("  "), "");
    }

    #[test]
    fn test_validate_invoice_reference() {
        assert!(validate_invoice_reference("78352"));
        assert!(validate_invoice_reference("INV-2025_01"));
        assert!(!validate_invoice_reference("AB"));
        assert!(!validate_invoice_reference("AB 12"));
        assert!(!validate_invoice_reference(""));
    }
}
