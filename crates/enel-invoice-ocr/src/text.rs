use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}/\d{2}/\d{4}").expect("hardcoded date regex is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Lower,
    Upper,
    Preserve,
}

/// Accent-folds, collapses whitespace and case-folds `value`.
#[must_use]
pub fn normalize_text(value: &str, case: Case) -> String {
    let folded = value
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect::<String>();
    let compact = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    match case {
        Case::Lower => compact.to_lowercase(),
        Case::Upper => compact.to_uppercase(),
        Case::Preserve => compact,
    }
}

pub(crate) fn normalize_lower(value: &str) -> String {
    normalize_text(value, Case::Lower)
}

/// Parses an amount that may use either `.` or `,` as decimal separator.
///
/// With both separators present the dot is a thousands separator. A trailing
/// minus marks a negative value. Anything unparsable yields zero.
#[must_use]
pub fn parse_decimal(value: &str) -> Decimal {
    let mut cleaned = value
        .chars()
        .filter(|ch| ch.is_ascii_digit() || matches!(ch, ',' | '.' | '-'))
        .collect::<String>();
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }

    let is_negative = cleaned.ends_with('-');
    if is_negative {
        cleaned.pop();
    }

    if cleaned.contains(',') && cleaned.contains('.') {
        cleaned = cleaned.replace('.', "").replace(',', ".");
    } else if cleaned.contains(',') {
        cleaned = cleaned.replace(',', ".");
    }

    match Decimal::from_str(&cleaned) {
        Ok(parsed) if is_negative => -parsed,
        Ok(parsed) => parsed,
        Err(_) => Decimal::ZERO,
    }
}

#[must_use]
pub fn parse_int(value: &str) -> i64 {
    let cleaned = value
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '-')
        .collect::<String>();
    cleaned.parse::<i64>().unwrap_or(0)
}

/// Renders the first `DD/MM/YYYY` found in `value` as `DD-MM-YYYY`, or returns
/// the trimmed input when there is none.
#[must_use]
pub fn format_date(value: &str) -> String {
    DATE_RE.find(value).map_or_else(
        || value.trim().to_string(),
        |found| found.as_str().replace('/', "-"),
    )
}

pub(crate) fn first_date(value: &str) -> Option<String> {
    DATE_RE
        .find(value)
        .map(|found| found.as_str().replace('/', "-"))
}
