//! Fiscal document data from the "informações tributárias" box.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{TaxInfo, Token};
use crate::rows::group_rows;
use crate::text::{first_date, normalize_lower};

static INVOICE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"nota fiscal[^0-9]*([0-9]{6,})")
        .expect("hardcoded invoice number regex is valid")
});
static CFOP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bcfop[^0-9]*([0-9]{4})\b").expect("hardcoded CFOP regex is valid")
});
static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("hardcoded digits regex is valid"));

const INVOICE_NUMBER_MIN_DIGITS: usize = 6;
const ACCESS_KEY_DIGITS: usize = 44;
const ISSUE_DATE_LABELS: &[&str] = &["data de emissao", "emissao"];
const PRESENTATION_DATE_LABELS: &[&str] = &["data de apresentacao", "apresentacao"];
const ACCESS_KEY_LABEL: &str = "chave de acesso";

fn all_digits(text: &str) -> String {
    DIGITS_RE
        .find_iter(text)
        .map(|found| found.as_str())
        .collect()
}

fn invoice_number(normalized: &str) -> Option<String> {
    if !normalized.contains("nota fiscal") {
        return None;
    }
    if let Some(captures) = INVOICE_NUMBER_RE.captures(normalized) {
        return Some(captures[1].to_string());
    }
    DIGITS_RE
        .find_iter(normalized)
        .map(|found| found.as_str())
        .find(|digits| digits.len() >= INVOICE_NUMBER_MIN_DIGITS)
        .map(str::to_string)
}

fn access_key(normalized: &str) -> Option<String> {
    if let Some(index) = normalized.find(ACCESS_KEY_LABEL) {
        let after = all_digits(&normalized[index + ACCESS_KEY_LABEL.len()..]);
        if after.len() >= ACCESS_KEY_DIGITS {
            return Some(after);
        }
    }
    let digits = all_digits(normalized);
    (digits.len() >= ACCESS_KEY_DIGITS).then(|| digits.chars().take(ACCESS_KEY_DIGITS).collect())
}

fn cfop(normalized: &str) -> Option<String> {
    CFOP_RE
        .captures(normalized)
        .map(|captures| captures[1].to_string())
}

fn date_after_label(normalized: &str, labels: &[&str]) -> Option<String> {
    labels.iter().find_map(|label| {
        let index = normalized.find(label)?;
        first_date(&normalized[index + label.len()..])
    })
}

#[derive(Default)]
struct TaxInfoFields {
    invoice_number: Option<String>,
    invoice_issue_date: Option<String>,
    access_key: Option<String>,
    cfop: Option<String>,
    presentation_date: Option<String>,
}

impl TaxInfoFields {
    fn scan_line(&mut self, normalized: &str) {
        if self.invoice_number.is_none() && normalized.contains("nota fiscal") {
            self.invoice_number = invoice_number(normalized);
            if self.invoice_issue_date.is_none() {
                self.invoice_issue_date = date_after_label(normalized, ISSUE_DATE_LABELS);
            }
        }
        if self.invoice_issue_date.is_none() && normalized.contains("emissao") {
            self.invoice_issue_date = date_after_label(normalized, ISSUE_DATE_LABELS);
        }
        if self.access_key.is_none() && normalized.contains(ACCESS_KEY_LABEL) {
            self.access_key = access_key(normalized);
        }
        if self.cfop.is_none() && normalized.contains("cfop") {
            self.cfop = cfop(normalized);
        }
        if self.presentation_date.is_none() && normalized.contains("apresentacao") {
            self.presentation_date = date_after_label(normalized, PRESENTATION_DATE_LABELS);
        }
    }

    fn fill_from_full_text(&mut self, full_text: &str) {
        self.invoice_number = self
            .invoice_number
            .take()
            .or_else(|| invoice_number(full_text));
        self.invoice_issue_date = self
            .invoice_issue_date
            .take()
            .or_else(|| date_after_label(full_text, ISSUE_DATE_LABELS));
        self.access_key = self.access_key.take().or_else(|| access_key(full_text));
        self.cfop = self.cfop.take().or_else(|| cfop(full_text));
        self.presentation_date = self
            .presentation_date
            .take()
            .or_else(|| date_after_label(full_text, PRESENTATION_DATE_LABELS));
    }

    fn into_tax_info(self) -> TaxInfo {
        let upper = |value: Option<String>| value.unwrap_or_default().to_uppercase();
        TaxInfo {
            invoice_number: upper(self.invoice_number),
            invoice_issue_date: upper(self.invoice_issue_date),
            access_key: upper(self.access_key),
            cfop: upper(self.cfop),
            presentation_date: upper(self.presentation_date),
            tax_items: Vec::new(),
        }
    }
}

/// Reads the invoice number, issue date, access key, CFOP and presentation
/// date, line by line first and then over the whole box. Tax lines are left
/// empty; they come from the tax table.
#[must_use]
pub fn extract(tokens: &[Token]) -> TaxInfo {
    let lines = group_rows(tokens)
        .iter()
        .map(|row| normalize_lower(&row.text()))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();

    let mut fields = TaxInfoFields::default();
    for line in &lines {
        fields.scan_line(line);
    }
    fields.fill_from_full_text(&lines.join(" "));
    fields.into_tax_info()
}
