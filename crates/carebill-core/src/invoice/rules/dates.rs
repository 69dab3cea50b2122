//! Calendar date extraction.
//!
//! Numeric dates are ambiguous (`03/04/2025`); they are resolved purely by the
//! order of layouts in each [`DatePattern`], day-first before month-first.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::patterns::{
    DATE_DASH_DMY, DATE_DASH_DMY_SHORT, DATE_DASH_YMD, DATE_DASH_YMD_SHORT, DATE_SLASH_DMY,
    DATE_SLASH_DMY_SHORT, DATE_SLASH_YMD, DATE_SLASH_YMD_SHORT, DATE_TEXTUAL,
};
use super::{ExtractionMatch, FieldExtractor};

/// Meaning of the three captures of a date pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    DayMonthYear,
    MonthDayYear,
    YearMonthDay,
    /// Day, month name (full or 3-letter), year.
    DayMonthNameYear,
}

/// A structural pattern plus the layouts tried, in order, on each match.
///
/// Each layout carries the equivalent `chrono` format string so a parsed
/// date can be printed back in the form it was read.
pub struct DatePattern {
    pub regex: &'static Regex,
    pub layouts: &'static [(DateOrder, &'static str)],
}

/// A parsed date and the layout that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch {
    pub date: NaiveDate,
    pub format: &'static str,
    pub source: String,
}

const DMY_MDY_SLASH: &[(DateOrder, &str)] = &[
    (DateOrder::DayMonthYear, "%d/%m/%Y"),
    (DateOrder::MonthDayYear, "%m/%d/%Y"),
];
const YMD_SLASH: &[(DateOrder, &str)] = &[(DateOrder::YearMonthDay, "%Y/%m/%d")];
const DMY_MDY_DASH: &[(DateOrder, &str)] = &[
    (DateOrder::DayMonthYear, "%d-%m-%Y"),
    (DateOrder::MonthDayYear, "%m-%d-%Y"),
];
const YMD_DASH: &[(DateOrder, &str)] = &[(DateOrder::YearMonthDay, "%Y-%m-%d")];
const DMY_MDY_SLASH_SHORT: &[(DateOrder, &str)] = &[
    (DateOrder::DayMonthYear, "%d/%m/%y"),
    (DateOrder::MonthDayYear, "%m/%d/%y"),
];
const YMD_SLASH_SHORT: &[(DateOrder, &str)] = &[(DateOrder::YearMonthDay, "%y/%m/%d")];
const DMY_MDY_DASH_SHORT: &[(DateOrder, &str)] = &[
    (DateOrder::DayMonthYear, "%d-%m-%y"),
    (DateOrder::MonthDayYear, "%m-%d-%y"),
];
const YMD_DASH_SHORT: &[(DateOrder, &str)] = &[(DateOrder::YearMonthDay, "%y-%m-%d")];
// The format string is switched to `%d %b %Y` for abbreviated month names.
const DAY_MONTH_NAME: &[(DateOrder, &str)] = &[(DateOrder::DayMonthNameYear, "%d %B %Y")];

lazy_static! {
    /// Default pattern list, in priority order.
    pub static ref DEFAULT_DATE_PATTERNS: Vec<DatePattern> = vec![
        DatePattern { regex: &DATE_SLASH_DMY, layouts: DMY_MDY_SLASH },
        DatePattern { regex: &DATE_SLASH_YMD, layouts: YMD_SLASH },
        DatePattern { regex: &DATE_DASH_DMY, layouts: DMY_MDY_DASH },
        DatePattern { regex: &DATE_DASH_YMD, layouts: YMD_DASH },
        DatePattern { regex: &DATE_SLASH_DMY_SHORT, layouts: DMY_MDY_SLASH_SHORT },
        DatePattern { regex: &DATE_SLASH_YMD_SHORT, layouts: YMD_SLASH_SHORT },
        DatePattern { regex: &DATE_DASH_DMY_SHORT, layouts: DMY_MDY_DASH_SHORT },
        DatePattern { regex: &DATE_DASH_YMD_SHORT, layouts: YMD_DASH_SHORT },
        DatePattern { regex: &DATE_TEXTUAL, layouts: DAY_MONTH_NAME },
    ];
}

/// Date extractor over an ordered pattern list.
pub struct DateExtractor<'a> {
    patterns: &'a [DatePattern],
}

impl DateExtractor<'static> {
    pub fn new() -> Self {
        Self {
            patterns: &DEFAULT_DATE_PATTERNS,
        }
    }
}

impl<'a> DateExtractor<'a> {
    pub fn with_patterns(patterns: &'a [DatePattern]) -> Self {
        Self { patterns }
    }
}

impl Default for DateExtractor<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor<'_> {
    type Output = ExtractionMatch<DateMatch>;

    /// Patterns are tried in order; within a pattern every structural match
    /// is tried until one parses as a real calendar date.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.patterns.iter().find_map(|pattern| {
            pattern
                .regex
                .captures_iter(text)
                .find_map(|caps| parse_captures(&caps, pattern.layouts))
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for pattern in self.patterns {
            for caps in pattern.regex.captures_iter(text) {
                if let Some(found) = parse_captures(&caps, pattern.layouts) {
                    // Skip if already found
                    if results.iter().any(|r| r.value.date == found.value.date) {
                        continue;
                    }
                    results.push(found);
                }
            }
        }

        results
    }
}

fn parse_captures(
    caps: &Captures<'_>,
    layouts: &'static [(DateOrder, &'static str)],
) -> Option<ExtractionMatch<DateMatch>> {
    let source = caps.get(0)?.as_str();

    layouts.iter().find_map(|&(order, format)| {
        let (date, format) = parse_layout(caps, order, format)?;
        Some(ExtractionMatch::new(
            DateMatch {
                date,
                format,
                source: source.to_string(),
            },
            "date",
            0.9,
            source,
        ))
    })
}

fn parse_layout(
    caps: &Captures<'_>,
    order: DateOrder,
    format: &'static str,
) -> Option<(NaiveDate, &'static str)> {
    let first = caps.get(1)?.as_str();
    let second = caps.get(2)?.as_str();
    let third = caps.get(3)?.as_str();

    match order {
        DateOrder::DayMonthYear => {
            ymd(parse_year(third)?, second.parse().ok()?, first.parse().ok()?).map(|d| (d, format))
        }
        DateOrder::MonthDayYear => {
            ymd(parse_year(third)?, first.parse().ok()?, second.parse().ok()?).map(|d| (d, format))
        }
        DateOrder::YearMonthDay => {
            ymd(parse_year(first)?, second.parse().ok()?, third.parse().ok()?).map(|d| (d, format))
        }
        DateOrder::DayMonthNameYear => {
            let (month, abbreviated) = month_from_name(second)?;
            let format = if abbreviated { "%d %b %Y" } else { format };
            ymd(parse_year(third)?, month, first.parse().ok()?).map(|d| (d, format))
        }
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Four-digit years as-is; two-digit years pivot at 69 (`69` → 1969,
/// `68` → 2068).
fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    match s.len() {
        4 => Some(year),
        2 if year < 69 => Some(2000 + year),
        2 => Some(1900 + year),
        _ => None,
    }
}

const MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

/// Month number and whether the 3-letter abbreviation was used.
fn month_from_name(name: &str) -> Option<(u32, bool)> {
    let lower = name.to_lowercase();
    MONTHS.iter().zip(1u32..).find_map(|(full, number)| {
        if lower == *full {
            Some((number, false))
        } else if lower.len() == 3 && full.starts_with(lower.as_str()) {
            Some((number, true))
        } else {
            None
        }
    })
}

/// First valid date in `text` using the default pattern list.
pub fn find_date(text: &str) -> Option<NaiveDate> {
    find_date_with(text, &DEFAULT_DATE_PATTERNS)
}

/// First valid date in `text` using a caller-supplied pattern list.
pub fn find_date_with(text: &str, patterns: &[DatePattern]) -> Option<NaiveDate> {
    DateExtractor::with_patterns(patterns)
        .extract(text)
        .map(|m| m.value.date)
}

/// Like [`find_date`], also returning the layout that matched.
pub fn find_date_match(text: &str) -> Option<DateMatch> {
    DateExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_first_numeric() {
        assert_eq!(find_date("Issued 25/08/2025"), Some(date(2025, 8, 25)));
        assert_eq!(find_date("25-08-2025"), Some(date(2025, 8, 25)));
    }

    #[test]
    fn test_ambiguous_date_is_day_first() {
        assert_eq!(find_date("03/04/2025"), Some(date(2025, 4, 3)));
    }

    #[test]
    fn test_month_first_when_day_first_invalid() {
        let found = find_date_match("08/25/2025").unwrap();
        assert_eq!(found.date, date(2025, 8, 25));
        assert_eq!(found.format, "%m/%d/%Y");
    }

    #[test]
    fn test_year_first() {
        assert_eq!(find_date("2025-08-25"), Some(date(2025, 8, 25)));
        assert_eq!(find_date("2025/08/25"), Some(date(2025, 8, 25)));
    }

    #[test]
    fn test_two_digit_years() {
        assert_eq!(find_date("25/08/25"), Some(date(2025, 8, 25)));
        assert_eq!(find_date("01-02-99"), Some(date(1999, 2, 1)));
    }

    #[test]
    fn test_textual_months() {
        assert_eq!(find_date("Issued: 25 August 2025"), Some(date(2025, 8, 25)));
        assert_eq!(find_date("25 AUG 2025"), Some(date(2025, 8, 25)));
        assert_eq!(find_date("25 Augst 2025"), None);
    }

    #[test]
    fn test_invalid_candidates_skipped() {
        assert_eq!(find_date("31/02/2025 then 01/03/2025"), Some(date(2025, 3, 1)));
        assert_eq!(find_date("no dates here"), None);
    }

    #[test]
    fn test_custom_pattern_list() {
        let only_iso = [DatePattern { regex: &DATE_DASH_YMD, layouts: YMD_DASH }];
        assert_eq!(find_date_with("25/08/2025 or 2025-09-01", &only_iso), Some(date(2025, 9, 1)));
    }

    #[test]
    fn test_round_trip_through_matched_format() {
        let samples = [
            "25/08/2025", "12/31/2024", "2025/08/25", "25-08-2025", "2025-08-25", "25/08/25",
            "2025-01-05", "25 August 2025", "25 Aug 2025", "01 Feb 2024",
        ];

        for sample in samples {
            let found = find_date_match(sample).unwrap();
            let printed = found.date.format(found.format).to_string();
            assert_eq!(printed.to_lowercase(), sample.to_lowercase(), "format {}", found.format);
        }
    }

    #[test]
    fn test_extract_all_dedupes() {
        let all = DateExtractor::new().extract_all("25/08/2025, 2025-08-25, 29 Aug 2025");
        let dates: Vec<NaiveDate> = all.into_iter().map(|m| m.value.date).collect();
        assert_eq!(dates, vec![date(2025, 8, 25), date(2025, 8, 29)]);
    }
}
