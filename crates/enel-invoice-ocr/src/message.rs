//! Figures carried in the free-text "mensagem importante" box.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{CreditInfo, TariffFlagPeriod};
use crate::text::{Case, normalize_text};

const MAX_FLAG_PERIODS: usize = 2;

static FLAG_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(AMARELA|VERDE|VERMELHA)\s*:?\s*(\d{1,2}[/-]\d{1,2}(?:[/-]\d{2,4})?)\s*(?:-|A|ATE)\s*(\d{1,2}[/-]\d{1,2}(?:[/-]\d{2,4})?)",
    )
    .expect("hardcoded tariff flag regex is valid")
});
static DAY_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})[/-](\d{1,2})(?:[/-](\d{2,4}))?$")
        .expect("hardcoded day/month regex is valid")
});

static INJECTED_RE: LazyLock<Regex> = LazyLock::new(|| kwh_regex("ENERGIA INJETADA HFP NO M.S:"));
static USED_RE: LazyLock<Regex> = LazyLock::new(|| kwh_regex("SALDO UTILIZADO NO M.S:"));
static UPDATED_RE: LazyLock<Regex> = LazyLock::new(|| kwh_regex("SALDO ATUALIZADO:"));
static EXPIRING_RE: LazyLock<Regex> =
    LazyLock::new(|| kwh_regex("CREDITOS A EXPIRAR NO PROXIMO M.S:"));

fn kwh_regex(label: &str) -> Regex {
    Regex::new(&format!(r"{label}\s*([0-9.,]+)\s*KWH")).expect("hardcoded kWh regex is valid")
}

/// `d/m[/y]` rendered as `DD-MM`.
fn day_month(value: &str) -> Option<String> {
    let captures = DAY_MONTH_RE.captures(value)?;
    let day = captures[1].parse::<u32>().ok()?;
    let month = captures[2].parse::<u32>().ok()?;
    Some(format!("{day:02}-{month:02}"))
}

/// Up to two distinct tariff flag periods, in order of appearance.
#[must_use]
pub fn tariff_flags(message: &str) -> Vec<TariffFlagPeriod> {
    let normalized = normalize_text(message, Case::Upper);
    let mut seen = HashSet::new();
    let mut periods = Vec::new();

    for captures in FLAG_RANGE_RE.captures_iter(&normalized) {
        let (Some(start_date), Some(end_date)) = (day_month(&captures[2]), day_month(&captures[3]))
        else {
            continue;
        };
        let period = TariffFlagPeriod {
            flag: captures[1].to_string(),
            start_date,
            end_date,
        };
        if !seen.insert(period.clone()) {
            continue;
        }
        periods.push(period);
        if periods.len() >= MAX_FLAG_PERIODS {
            break;
        }
    }
    periods
}

fn kwh(normalized: &str, pattern: &Regex) -> f64 {
    pattern
        .captures(normalized)
        .and_then(|captures| captures[1].replace(',', "").parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Distributed generation credit balances, in kWh.
#[must_use]
pub fn credit_info(message: &str) -> CreditInfo {
    let normalized = normalize_text(message, Case::Upper);
    CreditInfo {
        injected_hfp_kwh: kwh(&normalized, &INJECTED_RE),
        used_kwh: kwh(&normalized, &USED_RE),
        updated_kwh: kwh(&normalized, &UPDATED_RE),
        expiring_kwh: kwh(&normalized, &EXPIRING_RE),
    }
}
