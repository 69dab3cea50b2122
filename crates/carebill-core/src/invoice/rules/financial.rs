//! Line-based financial extraction and reconciliation.
//!
//! Statements put an amount on the line after its label about as often as
//! on the same line, so every labeled amount looks at both.

use rust_decimal::Decimal;

use super::amounts::{calculate_discount_amount, find_dollar_amounts, parse_money, to_money};
use super::patterns::{DOLLAR_AMOUNT, NEGATIVE_DOLLAR_AMOUNT, PERCENTAGE, TOTAL_GST_INCL, TOTAL_LABELED};
use super::ExtractionMatch;
use crate::models::record::{ExtractionWarning, WarningKind};

const PREVIOUS_BALANCE_LABEL: &str = "PREVIOUS BALANCE";
const FEE_DISCOUNT_LABEL: &str = "FEE DISCOUNT";

/// Cent tolerance for the advisory consistency checks.
pub const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Amounts read directly off the statement.
#[derive(Debug, Clone, Default)]
pub struct FinancialBreakdown {
    pub previous_balance: Option<ExtractionMatch<Decimal>>,
    pub original_amount: Option<ExtractionMatch<Decimal>>,
    pub discount_percentage: Option<ExtractionMatch<Decimal>>,
    pub discount_amount: Option<ExtractionMatch<Decimal>>,
    pub total_amount_due: Option<ExtractionMatch<Decimal>>,
}

/// Breakdown after derivation and consistency checks.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub breakdown: FinancialBreakdown,
    pub week_amount_due: Option<ExtractionMatch<Decimal>>,
    /// Legacy alias of the total, zero when no total was found.
    pub amount_due: Decimal,
    pub warnings: Vec<ExtractionWarning>,
}

/// Read the financial fields from sanitized text.
///
/// `fee_marker` is the resolved fee label (e.g. `Under 3 Fee`); without it
/// the original amount cannot be located.
pub fn extract_financials(text: &str, fee_marker: Option<&str>) -> FinancialBreakdown {
    let lines: Vec<&str> = text.lines().collect();
    let upper: Vec<String> = lines.iter().map(|l| l.to_uppercase()).collect();

    let labeled = |label: &str| -> Vec<usize> {
        upper
            .iter()
            .enumerate()
            .filter(|(_, l)| l.contains(label))
            .map(|(idx, _)| idx)
            .collect()
    };

    let previous_balance = labeled(PREVIOUS_BALANCE_LABEL)
        .into_iter()
        .find_map(|idx| first_dollar(lines[idx]))
        .map(|(value, source)| ExtractionMatch::new(value, "previous_balance_line", 0.9, source));

    let original_amount = fee_marker
        .map(str::to_uppercase)
        .filter(|marker| !marker.is_empty())
        .and_then(|marker| {
            labeled(marker.as_str())
                .into_iter()
                .filter(|&idx| !upper[idx].contains(FEE_DISCOUNT_LABEL))
                .find_map(|idx| same_or_next_line(&lines, idx, positive_dollar))
        })
        .map(|((value, source), same_line)| {
            let strategy = if same_line { "fee_line" } else { "fee_next_line" };
            ExtractionMatch::new(value, strategy, 0.9, source)
        });

    let discount_lines = labeled(FEE_DISCOUNT_LABEL);

    let discount_percentage = discount_lines.iter().find_map(|&idx| {
        PERCENTAGE.captures_iter(lines[idx]).find_map(|caps| {
            let pct: Decimal = caps[1].parse().ok()?;
            (pct >= Decimal::ZERO && pct <= Decimal::ONE_HUNDRED)
                .then(|| ExtractionMatch::new(pct, "fee_discount_percentage", 0.9, &caps[0]))
        })
    });

    let discount_amount = discount_lines
        .iter()
        .find_map(|&idx| same_or_next_line(&lines, idx, negative_dollar))
        .map(|((value, source), same_line)| {
            let strategy = if same_line { "fee_discount_line" } else { "fee_discount_next_line" };
            ExtractionMatch::new(value, strategy, 0.9, source)
        });

    FinancialBreakdown {
        previous_balance,
        original_amount,
        discount_percentage,
        discount_amount,
        total_amount_due: find_total(text),
    }
}

/// Labeled totals first; the largest dollar amount is a last resort.
fn find_total(text: &str) -> Option<ExtractionMatch<Decimal>> {
    let labeled = [
        ("amount_due_gst_incl", &*TOTAL_GST_INCL, 0.95),
        ("total_due_label", &*TOTAL_LABELED, 0.8),
    ];

    for (strategy, pattern, confidence) in labeled {
        if let Some(caps) = pattern.captures(text) {
            if let Some(value) = parse_money(&caps[1]) {
                return Some(ExtractionMatch::new(value, strategy, confidence, &caps[0]));
            }
        }
    }

    find_dollar_amounts(text)
        .into_iter()
        .max()
        .map(|value| ExtractionMatch::new(value, "largest_amount", 0.3, format!("${}", value)))
}

/// Derive what the statement leaves implicit and check the arithmetic.
///
/// Mismatches become warnings; extracted values are never altered. The week
/// amount is left unset when the discount exceeds the original amount, so
/// the total check is skipped in that case.
pub fn reconcile(mut breakdown: FinancialBreakdown) -> Reconciliation {
    let mut warnings = Vec::new();

    let original = non_zero(&breakdown.original_amount);
    let percentage = breakdown.discount_percentage.as_ref().map(|m| m.value);

    if breakdown.discount_amount.is_none() {
        if let (Some(original), Some(pct)) = (original, percentage) {
            let derived = to_money(calculate_discount_amount(original, pct));
            let source = format!("{}% of {}", pct, original);
            breakdown.discount_amount = Some(ExtractionMatch::new(derived, "derived", 0.8, source));
        }
    }

    let discount = non_zero(&breakdown.discount_amount);

    let week_amount_due = match (original, discount) {
        (Some(original), Some(discount)) if discount <= original => Some(ExtractionMatch::new(
            original - discount,
            "original_minus_discount",
            0.9,
            format!("{} - {}", original, discount),
        )),
        _ => None,
    };

    if let (Some(original), Some(pct), Some(discount)) = (original, percentage, discount) {
        let expected = calculate_discount_amount(original, pct);
        if (expected - discount).abs() > TOLERANCE {
            warnings.push(ExtractionWarning::new(
                WarningKind::DiscountMismatch,
                format!(
                    "Discount {} does not match {}% of {} (expected {})",
                    discount,
                    pct,
                    original,
                    to_money(expected)
                ),
            ));
        }
    }

    if let (Some(original), Some(discount)) = (original, discount) {
        if discount > original {
            warnings.push(ExtractionWarning::new(
                WarningKind::DiscountExceedsOriginal,
                format!("Discount {} exceeds original amount {}", discount, original),
            ));
        }
    }

    let total = non_zero(&breakdown.total_amount_due);

    if let (Some(total), Some(week)) = (total, week_amount_due.as_ref().map(|m| m.value)) {
        let previous = breakdown
            .previous_balance
            .as_ref()
            .map(|m| m.value)
            .unwrap_or(Decimal::ZERO);
        let expected = week + previous;
        if (total - expected).abs() > TOLERANCE {
            warnings.push(ExtractionWarning::new(
                WarningKind::TotalMismatch,
                format!(
                    "Total {} does not match week amount {} plus previous balance {}",
                    total, week, previous
                ),
            ));
        }
    }

    Reconciliation {
        breakdown,
        week_amount_due,
        amount_due: total.unwrap_or(Decimal::ZERO),
        warnings,
    }
}

fn non_zero(field: &Option<ExtractionMatch<Decimal>>) -> Option<Decimal> {
    field.as_ref().map(|m| m.value).filter(|v| !v.is_zero())
}

/// Apply `find` to line `idx`, then to the line after it. The flag is true
/// when the value came from line `idx` itself.
fn same_or_next_line<'t, T>(
    lines: &[&'t str],
    idx: usize,
    find: impl Fn(&'t str) -> Option<T>,
) -> Option<(T, bool)> {
    if let Some(found) = find(lines[idx]) {
        return Some((found, true));
    }
    lines.get(idx + 1).and_then(|next| find(*next)).map(|found| (found, false))
}

/// Magnitude of the first `$amount`, signed or not.
fn first_dollar(line: &str) -> Option<(Decimal, &str)> {
    DOLLAR_AMOUNT.captures_iter(line).find_map(|caps| {
        let whole = caps.get(0)?;
        Some((parse_money(&caps[2])?, whole.as_str()))
    })
}

fn positive_dollar(line: &str) -> Option<(Decimal, &str)> {
    DOLLAR_AMOUNT
        .captures_iter(line)
        .filter(|caps| caps.get(1).is_none())
        .find_map(|caps| {
            let whole = caps.get(0)?;
            Some((parse_money(&caps[2])?, whole.as_str()))
        })
}

/// Magnitude of the first `-$amount`.
fn negative_dollar(line: &str) -> Option<(Decimal, &str)> {
    let caps = NEGATIVE_DOLLAR_AMOUNT.captures(line)?;
    let whole = caps.get(0)?;
    Some((parse_money(&caps[1])?, whole.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    const SOFIA_LINES: &str = "Item Description Type Ref Date Debit Credit
Previous Balance $86.52
1Under 3 Fee May 2025 23 Aug-29 Aug INV 78352
6929 Aug 2025 $321.75
2Fee Discount of 75.00% INV 78352
6929 Aug 2025 -$241.31
Amount due (GST incl) $166.96";

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn value(field: &Option<ExtractionMatch<Decimal>>) -> Option<Decimal> {
        field.as_ref().map(|m| m.value)
    }

    fn kinds(warnings: &[ExtractionWarning]) -> Vec<WarningKind> {
        warnings.iter().map(|w| w.kind).collect()
    }

    fn breakdown(original: Decimal, pct: Decimal, discount: Decimal) -> FinancialBreakdown {
        FinancialBreakdown {
            original_amount: Some(ExtractionMatch::new(original, "test", 1.0, "")),
            discount_percentage: Some(ExtractionMatch::new(pct, "test", 1.0, "")),
            discount_amount: Some(ExtractionMatch::new(discount, "test", 1.0, "")),
            ..Default::default()
        }
    }

    #[test]
    fn test_statement_lines() {
        let found = extract_financials(SOFIA_LINES, Some("Under 3 Fee"));

        assert_eq!(value(&found.previous_balance), Some(dec("86.52")));
        assert_eq!(value(&found.original_amount), Some(dec("321.75")));
        assert_eq!(value(&found.discount_percentage), Some(dec("75.00")));
        assert_eq!(value(&found.discount_amount), Some(dec("241.31")));
        assert_eq!(value(&found.total_amount_due), Some(dec("166.96")));

        assert_eq!(found.original_amount.unwrap().strategy, "fee_next_line");
        assert_eq!(found.discount_amount.unwrap().strategy, "fee_discount_next_line");
        assert_eq!(found.total_amount_due.unwrap().strategy, "amount_due_gst_incl");
    }

    #[test]
    fn test_amount_on_same_line_wins() {
        let text = "Under 3 Fee $300.00\nnext $999.00\nFee Discount 10% -$30.00\n-$45.00";
        let found = extract_financials(text, Some("Under 3 Fee"));

        assert_eq!(value(&found.original_amount), Some(dec("300.00")));
        assert_eq!(found.original_amount.unwrap().strategy, "fee_line");
        assert_eq!(value(&found.discount_amount), Some(dec("30.00")));
    }

    #[test]
    fn test_previous_balance_is_a_magnitude() {
        let found = extract_financials("Previous Balance -$20.00\nAmount due (GST incl) $10.00", None);
        let previous = found.previous_balance.unwrap();

        assert_eq!(previous.value, dec("20.00"));
        assert_eq!(previous.source, "-$20.00");
    }

    #[test]
    fn test_label_lines_without_amounts_are_skipped() {
        let text = "Previous Balance (see over)
notes
Previous Balance $86.52
Under 3 Fee Schedule
see below
Under 3 Fee $300.00
Fee Discount (conditions apply)
terms
Fee Discount 10% -$30.00";
        let found = extract_financials(text, Some("Under 3 Fee"));

        assert_eq!(value(&found.previous_balance), Some(dec("86.52")));
        assert_eq!(value(&found.original_amount), Some(dec("300.00")));
        assert_eq!(found.original_amount.unwrap().strategy, "fee_line");
        assert_eq!(value(&found.discount_percentage), Some(dec("10")));
        assert_eq!(value(&found.discount_amount), Some(dec("30.00")));
        assert_eq!(found.discount_amount.unwrap().strategy, "fee_discount_line");
    }

    #[test]
    fn test_percentage_keeps_full_precision() {
        let found = extract_financials("Fee Discount of 75.125% -$241.71", None);
        let pct = found.discount_percentage.unwrap();

        assert_eq!(pct.value, dec("75.125"));
        assert_eq!(pct.value.scale(), 3);
    }

    #[test]
    fn test_original_amount_needs_marker() {
        let found = extract_financials(SOFIA_LINES, None);
        assert!(found.original_amount.is_none());
    }

    #[test]
    fn test_percentage_out_of_range_discarded() {
        let found = extract_financials("Fee Discount of 150% -$10.00", None);
        assert!(found.discount_percentage.is_none());
        assert_eq!(value(&found.discount_amount), Some(dec("10.00")));
    }

    #[test]
    fn test_positive_amount_is_not_a_discount() {
        let found = extract_financials("Fee Discount of 10%\n$10.00", None);
        assert!(found.discount_amount.is_none());
    }

    #[test]
    fn test_labeled_total_fallback() {
        let found = extract_financials("Balance due: $55.10\nOther $900.00", None);
        let total = found.total_amount_due.unwrap();
        assert_eq!(total.value, dec("55.10"));
        assert_eq!(total.strategy, "total_due_label");
    }

    #[test]
    fn test_largest_amount_fallback() {
        let found = extract_financials("Fees $120.00\nCredit -$15.00\nLate fee $1,020.50\n$99.99", None);
        let total = found.total_amount_due.unwrap();
        assert_eq!(total.value, dec("1020.50"));
        assert_eq!(total.strategy, "largest_amount");
    }

    #[test]
    fn test_no_amounts() {
        let found = extract_financials("nothing to see", Some("Under 3 Fee"));
        assert!(found.previous_balance.is_none());
        assert!(found.total_amount_due.is_none());
    }

    #[test]
    fn test_week_amount_and_discount_check() {
        let result = reconcile(breakdown(dec("321.75"), dec("75.00"), dec("241.31")));

        assert_eq!(value(&result.week_amount_due), Some(dec("80.44")));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_total_check_passes() {
        let mut input = breakdown(dec("321.75"), dec("75.00"), dec("241.31"));
        input.previous_balance = Some(ExtractionMatch::new(dec("86.52"), "test", 1.0, ""));
        input.total_amount_due = Some(ExtractionMatch::new(dec("166.96"), "test", 1.0, ""));

        let result = reconcile(input);
        assert_eq!(result.amount_due, dec("166.96"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_mismatches_are_warnings() {
        let mut input = breakdown(dec("100.00"), dec("50.00"), dec("40.00"));
        input.total_amount_due = Some(ExtractionMatch::new(dec("75.00"), "test", 1.0, ""));

        let result = reconcile(input);

        assert_eq!(
            kinds(&result.warnings),
            vec![WarningKind::DiscountMismatch, WarningKind::TotalMismatch]
        );
        assert_eq!(value(&result.breakdown.discount_amount), Some(dec("40.00")));
        assert_eq!(value(&result.week_amount_due), Some(dec("60.00")));
        assert_eq!(result.amount_due, dec("75.00"));
    }

    #[test]
    fn test_discount_exceeding_original() {
        let mut input = breakdown(dec("50.00"), dec("0"), dec("80.00"));
        input.discount_percentage = None;

        input.total_amount_due = Some(ExtractionMatch::new(dec("10.00"), "test", 1.0, ""));

        let result = reconcile(input);
        assert_eq!(kinds(&result.warnings), vec![WarningKind::DiscountExceedsOriginal]);
        assert!(result.week_amount_due.is_none());
        assert_eq!(result.amount_due, dec("10.00"));
    }

    #[test]
    fn test_discount_derived_from_percentage() {
        let mut input = breakdown(dec("321.75"), dec("75.00"), dec("0"));
        input.discount_amount = None;

        let result = reconcile(input);
        let discount = result.breakdown.discount_amount.unwrap();

        assert_eq!(discount.value, dec("241.31"));
        assert_eq!(discount.strategy, "derived");
        assert_eq!(value(&result.week_amount_due), Some(dec("80.44")));
    }

    #[test]
    fn test_week_amount_requires_non_zero_inputs() {
        let mut input = breakdown(dec("321.75"), dec("0"), dec("0"));
        input.discount_percentage = None;

        let result = reconcile(input);
        assert!(result.week_amount_due.is_none());
        assert_eq!(result.amount_due, Decimal::ZERO);
    }
}
