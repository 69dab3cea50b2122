//! Common regex patterns for daycare statement extraction.
//!
//! Label patterns run against an uppercased copy of the sanitized text unless
//! they carry their own `(?i)` flag.

use lazy_static::lazy_static;
use regex::Regex;

/// A date as printed on statements: `25/08/2025`, `2025-08-25`, `25 Aug 2025`.
const DATE_TOKEN: &str =
    r"(\d{1,2}[/-]\d{1,2}[/-]\d{2,4}|\d{4}[/-]\d{1,2}[/-]\d{1,2}|\d{1,2}\s+[A-Za-z]{3,9}\.?\s+\d{4})";

/// A 2-place amount with optional thousands separators.
const AMOUNT_TOKEN: &str = r"((?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2})\b";

fn labeled_date(label: &str) -> Regex {
    Regex::new(&format!(r"\b{}\s*:?\s*{}", label, DATE_TOKEN)).unwrap()
}

/// Name captured up to the end of the line or the word AMOUNT.
fn labeled_name(label: &str) -> Regex {
    Regex::new(&format!(
        r"(?m)\b{}\s*:\s*([A-Z][A-Z' ]*?)[ \t]*(?:\bAMOUNT\b|$)",
        label
    ))
    .unwrap()
}

lazy_static! {
    // Sanitizer
    pub static ref MARKUP_BLOCK: Regex = Regex::new(
        r"(?is)<(?:script|style)\b[^>]*>.*?</(?:script|style)\s*>"
    ).unwrap();

    pub static ref MARKUP_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();

    // Money
    pub static ref MONEY: Regex = Regex::new(&format!(r"\$?{}", AMOUNT_TOKEN)).unwrap();

    /// Dollar-prefixed amount; group 1 is the optional minus sign.
    pub static ref DOLLAR_AMOUNT: Regex = Regex::new(
        &format!(r"(-\s?)?\$\s?{}", AMOUNT_TOKEN)
    ).unwrap();

    pub static ref NEGATIVE_DOLLAR_AMOUNT: Regex = Regex::new(
        &format!(r"-\s?\$\s?{}", AMOUNT_TOKEN)
    ).unwrap();

    pub static ref PERCENTAGE: Regex = Regex::new(
        r"\b(\d{1,3}(?:\.\d{1,4})?)\s*%"
    ).unwrap();

    // Totals
    pub static ref TOTAL_GST_INCL: Regex = Regex::new(
        &format!(r"(?i)\bamount\s+due\s*\(\s*gst\s+incl\.?\s*\)\s*:?\s*\$\s?{}", AMOUNT_TOKEN)
    ).unwrap();

    pub static ref TOTAL_LABELED: Regex = Regex::new(
        &format!(
            r"(?i)\b(?:total\s+(?:amount\s+)?due|balance\s+due|amount\s+due)[ \t]*:?[ \t]*\$?[ \t]*{}",
            AMOUNT_TOKEN
        )
    ).unwrap();

    // Numeric dates
    pub static ref DATE_SLASH_DMY: Regex = Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").unwrap();
    pub static ref DATE_SLASH_YMD: Regex = Regex::new(r"\b(\d{4})/(\d{1,2})/(\d{1,2})\b").unwrap();
    pub static ref DATE_DASH_DMY: Regex = Regex::new(r"\b(\d{1,2})-(\d{1,2})-(\d{4})\b").unwrap();
    pub static ref DATE_DASH_YMD: Regex = Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").unwrap();
    pub static ref DATE_SLASH_DMY_SHORT: Regex = Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{2})\b").unwrap();
    pub static ref DATE_SLASH_YMD_SHORT: Regex = Regex::new(r"\b(\d{2})/(\d{1,2})/(\d{1,2})\b").unwrap();
    pub static ref DATE_DASH_DMY_SHORT: Regex = Regex::new(r"\b(\d{1,2})-(\d{1,2})-(\d{2})\b").unwrap();
    pub static ref DATE_DASH_YMD_SHORT: Regex = Regex::new(r"\b(\d{2})-(\d{1,2})-(\d{1,2})\b").unwrap();

    /// `25 August 2025` / `25 Aug 2025`.
    pub static ref DATE_TEXTUAL: Regex = Regex::new(
        r"(?i)\b(\d{1,2})\s+([A-Za-z]{3,9})\.?\s+(\d{4})\b"
    ).unwrap();

    // Labeled dates
    pub static ref ISSUED: Regex = labeled_date("ISSUED");
    pub static ref ISSUE_DATE: Regex = labeled_date(r"ISSUE\s*DATE");
    pub static ref INVOICE_DATE: Regex = labeled_date(r"INVOICE\s*DATE");
    pub static ref DATE_GENERIC: Regex = labeled_date("DATE");
    pub static ref DUE_DATE: Regex = labeled_date(r"DUE\s*DATE");
    pub static ref PAYMENT_DUE: Regex = labeled_date(r"(?:PAYMENT\s+DUE|DUE\s+(?:BY|ON)|PAY\s+BY)");
    pub static ref PERIOD_RANGE: Regex = Regex::new(
        &format!(r"\bPERIOD\s*:?\s*{}\s*(?:-|–|TO)\s*{}", DATE_TOKEN, DATE_TOKEN)
    ).unwrap();
    pub static ref PERIOD_FROM: Regex = labeled_date(r"PERIOD\s*(?:FROM|START(?:S|ING)?)");
    pub static ref PERIOD_TO: Regex = labeled_date(r"PERIOD\s*(?:TO|END(?:S|ING)?)");
    pub static ref PERIOD_SINGLE: Regex = labeled_date("PERIOD");
    pub static ref FROM_GENERIC: Regex = labeled_date("FROM");
    pub static ref TO_GENERIC: Regex = labeled_date("TO");

    // Invoice reference
    pub static ref INV_NUMBER: Regex = Regex::new(r"\bINV\.?\s+(\d+)\b").unwrap();
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"\bINVOICE\s*(?:(?:NO\b\.?|NUMBER\b|#)\s*:?|:)\s*([A-Z0-9][A-Z0-9_\-]*)"
    ).unwrap();
    pub static ref REFERENCE_LABELED: Regex = Regex::new(
        r"\bREFERENCE\s*:\s*([A-Z0-9][A-Z0-9_\-]*)"
    ).unwrap();
    pub static ref REF_BARE: Regex = Regex::new(
        r"\bREF\.?\s+([A-Z0-9_\-]*\d[A-Z0-9_\-]*)"
    ).unwrap();

    // Child name
    pub static ref CHILD_NAME_LABEL: Regex = labeled_name(r"CHILD\s*NAME");
    pub static ref STUDENT_NAME_LABEL: Regex = labeled_name(r"STUDENT\s*NAME");
    pub static ref CHILD_LABEL: Regex = labeled_name("CHILD");
    pub static ref FOR_LABEL: Regex = labeled_name("FOR");
    pub static ref STATEMENT_HEADING: Regex = Regex::new(
        r"\bSTATEMENT\s+FOR\s+([A-Z][A-Z' ]*[A-Z])(?:\s*-\s*([A-Z0-9]+)\b)?"
    ).unwrap();
    pub static ref NAME_LABEL: Regex = labeled_name("NAME");

    // Child reference
    pub static ref CHILD_REF_LABEL: Regex = Regex::new(
        r"\b(?:CHILD|STUDENT)\s*(?:REFERENCE|REF|ID|NO)\.?\s*:\s*([A-Z0-9]+)\b"
    ).unwrap();
    pub static ref REFERENCE_COLON: Regex = Regex::new(
        r"\b(?:REFERENCE|REF)\s*:\s*([A-Z0-9]+)\b"
    ).unwrap();
    pub static ref ID_COLON: Regex = Regex::new(r"\b(?:ID|NO)\s*:\s*([A-Z0-9]+)\b").unwrap();
    pub static ref STATEMENT_HEADING_REF: Regex = Regex::new(
        r"\bSTATEMENT\s+FOR\s+[A-Z][A-Z' ]*-\s*([A-Z0-9]+)\b"
    ).unwrap();
    pub static ref REFERENCE_NUMBER: Regex = Regex::new(
        r"\bREFERENCE\s+NUMBER\s+([A-Z0-9]+)\b"
    ).unwrap();

    // Fee type
    pub static ref UNDER_N_FEE: Regex = Regex::new(r"(?i)(under\s*\d+\s+fee)\b").unwrap();
    pub static ref TOKEN_FEE: Regex = Regex::new(r"(?i)\b(\d+\w*\s+fee)\b").unwrap();
    pub static ref FEE_TYPE_LABEL: Regex = Regex::new(
        r"(?im)\bfee\s*type\s*:[ \t]*(\S[^\n]*?)[ \t]*$"
    ).unwrap();
    pub static ref SERVICE_LABEL: Regex = Regex::new(
        r"(?im)\bservice\s*:[ \t]*(\S[^\n]*?)[ \t]*$"
    ).unwrap();

    // Provider
    pub static ref FROM_LABEL: Regex = Regex::new(r"(?im)\bfrom\s*:[ \t]*(\S[^\n]*?)[ \t]*$").unwrap();
}
