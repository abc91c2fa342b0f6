//! Single-value mappers for the small fixed regions of the invoice.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::layout::LayoutId;
use crate::text::{normalize_lower, parse_decimal, parse_int};

static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("hardcoded digits regex is valid"));
static PAIR_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\\/|\-]+").expect("hardcoded separator regex is valid"));
static TAX_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b[0-9]{2}\.[0-9]{3}\.[0-9]{3}/[0-9]{4}-[0-9]{2}\b|\b[0-9]{3}\.[0-9]{3}\.[0-9]{3}-[0-9]{2}\b",
    )
    .expect("hardcoded CPF/CNPJ regex is valid")
});

const AMOUNT_LABELS: &[&str] = &["pagar", "paga", "pagamento"];
const PERIOD_LABELS: &[&str] = &["mes/ano", "mes ano"];

fn non_blank(texts: &[String]) -> impl Iterator<Item = &str> {
    texts.iter().map(|text| text.trim()).filter(|text| !text.is_empty())
}

/// First non-blank text, upper-cased.
#[must_use]
pub fn first_item(texts: &[String]) -> String {
    non_blank(texts).next().unwrap_or_default().to_uppercase()
}

/// All non-blank texts joined by single spaces, upper-cased.
#[must_use]
pub fn joined_text(texts: &[String]) -> String {
    non_blank(texts).collect::<Vec<_>>().join(" ").to_uppercase()
}

/// The first value, or the next one when the first is only a label.
fn value_after_label(texts: &[String], is_label: impl Fn(&str) -> bool) -> String {
    let first = first_item(texts);
    if first.is_empty() || !is_label(&normalize_lower(&first)) {
        return first;
    }
    texts
        .iter()
        .skip(1)
        .map(|text| text.trim())
        .find(|text| !text.is_empty())
        .map_or(first, str::to_string)
}

#[must_use]
pub fn billing_period(texts: &[String]) -> String {
    let value = value_after_label(texts, |normalized| PERIOD_LABELS.contains(&normalized));
    let cleaned = value.trim();
    let bytes = cleaned.as_bytes();
    if bytes.len() == 7 && bytes[2] == b'/' {
        return cleaned.replace('/', "-");
    }
    cleaned.to_string()
}

#[must_use]
pub fn due_date(texts: &[String]) -> String {
    let value = first_item(texts);
    let bytes = value.as_bytes();
    if bytes.len() == 10 && bytes[2] == b'/' && bytes[5] == b'/' {
        return value.replace('/', "-");
    }
    value
}

#[must_use]
pub fn amount_due(texts: &[String]) -> Decimal {
    let value = value_after_label(texts, |normalized| {
        AMOUNT_LABELS
            .iter()
            .any(|label| normalized.contains(label))
    });
    parse_decimal(&value)
}

#[must_use]
pub fn reading_days(texts: &[String]) -> i64 {
    parse_int(&first_item(texts))
}

/// Splits a "left / right" pair of identifiers.
pub(crate) fn split_pair(raw: &str) -> (String, String) {
    let digits = DIGITS_RE
        .find_iter(raw)
        .map(|found| found.as_str())
        .collect::<Vec<_>>();
    match digits.as_slice() {
        [first, second, ..] => return ((*first).to_string(), (*second).to_string()),
        [only] => return ((*only).to_string(), String::new()),
        [] => {}
    }

    let parts = PAIR_SEPARATOR_RE
        .split(raw)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>();
    match parts.as_slice() {
        [first, second, ..] => ((*first).to_string(), (*second).to_string()),
        [only] => ((*only).to_string(), String::new()),
        [] => (raw.trim().to_string(), String::new()),
    }
}

/// Customer or installation number. The second layout prints both numbers in
/// one box; the field is the right-hand one.
#[must_use]
pub fn identifier(texts: &[String], layout: LayoutId) -> String {
    let value = first_item(texts);
    if layout != LayoutId::V2 {
        return value;
    }
    let (_, right) = split_pair(&value);
    if right.is_empty() { value } else { right }
}

/// Customer name and CPF/CNPJ from the personal data box.
#[must_use]
pub fn personal_data(texts: &[String]) -> (String, String) {
    let lines = non_blank(texts).collect::<Vec<_>>();

    let name = lines
        .iter()
        .find(|line| {
            let normalized = normalize_lower(line);
            !normalized.contains("cpf") && !normalized.contains("cnpj") && !normalized.contains("cep")
        })
        .copied()
        .unwrap_or_default();

    let tax_number = lines
        .iter()
        .filter(|line| {
            let normalized = normalize_lower(line);
            normalized.contains("cpf") || normalized.contains("cnpj")
        })
        .find_map(|line| {
            if let Some(found) = TAX_NUMBER_RE.find(line) {
                return Some(found.as_str().to_string());
            }
            let digits = DIGITS_RE
                .find_iter(line)
                .map(|found| found.as_str())
                .collect::<String>();
            matches!(digits.len(), 11 | 14).then_some(digits)
        })
        .unwrap_or_default();

    (name.to_uppercase(), tax_number.to_uppercase())
}
