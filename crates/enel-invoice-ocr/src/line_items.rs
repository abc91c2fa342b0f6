//! Billing line items ("descrição dos itens de fatura").
//!
//! On top of the generic column assignment this table recovers wrapped
//! product codes, descriptions split across lines and totals rows whose label
//! and figures were recognized on separate lines. Extraction ends at the
//! `TOTAL` row, which is kept.
//!
//! Header lines folded into the header (a wrapped "DA FATURA" under
//! "DESCRIÇÃO DOS ITENS") are never read as body rows, so they cannot surface
//! as items.

use crate::columns::{ColumnPositions, assign_row};
use crate::header::HeaderRule;
use crate::model::{InvoiceLineItem, Row, Token};
use crate::table::{AssignedRow, ColumnDef, MidpointFallback, TableSpec, locate};
use crate::text::{normalize_lower, parse_decimal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Column {
    Description,
    Unit,
    Quantity,
    UnitPriceWithTaxes,
    Amount,
    PisCofins,
    IcmsTaxBase,
    IcmsRate,
    IcmsAmount,
    UnitRate,
}

const ALLOWED_UNITS: &[&str] = &["kwh", "kw", "mwh", "m3", "wh", "unid"];
const CODE_ROW_MAX_DIGITS: usize = 6;
const CODE_ROW_LIMIT_RATIO: f64 = 0.75;
const TOTAL_LABEL: &str = "total";

pub(crate) const SPEC: TableSpec<Column> = TableSpec {
    name: "line_items",
    columns: &[
        ColumnDef {
            column: Column::Description,
            aliases: &["descricao", "itens", "fatura"],
        },
        ColumnDef {
            column: Column::Unit,
            aliases: &["unid"],
        },
        ColumnDef {
            column: Column::Quantity,
            aliases: &["quant"],
        },
        ColumnDef {
            column: Column::UnitPriceWithTaxes,
            aliases: &["preco"],
        },
        ColumnDef {
            column: Column::Amount,
            aliases: &["valor"],
        },
        ColumnDef {
            column: Column::PisCofins,
            aliases: &["pis", "cofins"],
        },
        ColumnDef {
            column: Column::IcmsTaxBase,
            aliases: &["base"],
        },
        ColumnDef {
            column: Column::IcmsRate,
            aliases: &["aliquota"],
        },
        ColumnDef {
            column: Column::IcmsAmount,
            aliases: &["icms"],
        },
        ColumnDef {
            column: Column::UnitRate,
            aliases: &["tarifa"],
        },
    ],
    keywords: &[
        "descricao",
        "itens",
        "fatura",
        "unid",
        "quant",
        "preco",
        "valor",
        "pis",
        "cofins",
        "base",
        "aliquota",
        "icms",
        "tarifa",
    ],
    header: HeaderRule {
        min_hits: 3,
        primary: &["descricao", "itens", "fatura"],
        short_row_tokens: None,
    },
    required: Column::Description,
    rightmost_anchor: Some(Column::Description),
    midpoint_fallback: Some(MidpointFallback {
        column: Column::Amount,
        left: Column::UnitPriceWithTaxes,
        right: Column::PisCofins,
    }),
    section_titles: &[],
    fold_header_continuation: true,
};

fn is_numeric_text(value: &str) -> bool {
    !value.is_empty()
        && value
            .trim()
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '.' | ',' | '-' | '%'))
}

fn is_numeric_row(row: &Row) -> bool {
    !row.is_empty() && row.tokens.iter().all(|token| is_numeric_text(&token.text))
}

/// Left edge a wrapped code must stay behind: three quarters of the way from
/// the description column to its right neighbour.
fn code_row_limit(positions: &ColumnPositions<Column>) -> Option<f64> {
    let description = positions.get(Column::Description)?;
    let next = positions.right_neighbour(Column::Description)?;
    Some(description + (next - description) * CODE_ROW_LIMIT_RATIO)
}

fn is_code_row(row: &Row, limit: Option<f64>) -> bool {
    let Some(limit) = limit else {
        return false;
    };
    if row.is_empty() || !row.tokens.iter().all(|token| token.rect.x_min < limit) {
        return false;
    }

    let combined = row
        .tokens
        .iter()
        .map(|token| token.text.trim())
        .collect::<String>();
    !combined.is_empty()
        && combined.chars().all(|ch| ch.is_ascii_digit())
        && combined.chars().count() <= CODE_ROW_MAX_DIGITS
}

fn append_description(row: &mut AssignedRow<Column>, suffix: &str) {
    let description = row.entry(Column::Description).or_default();
    *description = format!("{description} {suffix}").trim().to_string();
}

/// Moves anything that is not a known unit out of the unit column and onto
/// the end of the description.
fn filter_units(row: &mut AssignedRow<Column>) {
    let unit = row.get(&Column::Unit).cloned().unwrap_or_default();
    if unit.is_empty() {
        return;
    }

    let (kept, moved): (Vec<&str>, Vec<&str>) = unit
        .split_whitespace()
        .partition(|token| ALLOWED_UNITS.contains(&normalize_lower(token).as_str()));
    if !moved.is_empty() {
        append_description(row, &moved.join(" "));
    }
    row.insert(Column::Unit, kept.join(" "));
}

fn cell(row: &AssignedRow<Column>, column: Column) -> &str {
    row.get(&column).map_or("", String::as_str)
}

fn to_record(row: &AssignedRow<Column>) -> InvoiceLineItem {
    InvoiceLineItem {
        description: cell(row, Column::Description).to_uppercase(),
        unit: cell(row, Column::Unit).to_uppercase(),
        quantity: parse_decimal(cell(row, Column::Quantity)),
        unit_price_with_taxes: parse_decimal(cell(row, Column::UnitPriceWithTaxes)),
        amount: parse_decimal(cell(row, Column::Amount)),
        pis_cofins: parse_decimal(cell(row, Column::PisCofins)),
        icms_tax_base: parse_decimal(cell(row, Column::IcmsTaxBase)),
        icms_rate: parse_decimal(cell(row, Column::IcmsRate)),
        icms_amount: parse_decimal(cell(row, Column::IcmsAmount)),
        unit_rate: parse_decimal(cell(row, Column::UnitRate)),
    }
}

/// Extracts the billing line items of one region. Returns no items when the
/// header or the description column cannot be found.
#[must_use]
pub fn extract(tokens: &[Token]) -> Vec<InvoiceLineItem> {
    let Some(table) = locate(&SPEC, tokens) else {
        return Vec::new();
    };
    let limit = code_row_limit(&table.positions);

    let mut results: Vec<AssignedRow<Column>> = Vec::new();
    let mut pending_numeric: Option<&Row> = None;

    for row in table.body() {
        if is_code_row(row, limit)
            && let Some(previous) = results.last_mut()
        {
            append_description(previous, &row.text());
            continue;
        }

        if is_numeric_row(row) {
            pending_numeric = Some(row);
            continue;
        }

        let mut assigned = assign_row(&SPEC, &table.positions, &row.tokens);
        filter_units(&mut assigned);

        let description = normalize_lower(cell(&assigned, Column::Description));
        if description.is_empty() {
            if let Some(previous) = results.last_mut() {
                append_description(previous, &row.text());
            }
            continue;
        }

        let is_total = description == TOTAL_LABEL;
        if is_total && let Some(numeric) = pending_numeric.take() {
            let figures = assign_row(&SPEC, &table.positions, &numeric.tokens);
            for (column, value) in figures {
                let target = assigned.entry(column).or_default();
                if target.is_empty() {
                    *target = value;
                }
            }
        }

        results.push(assigned);
        if is_total {
            break;
        }
    }

    tracing::debug!(items = results.len(), "line items extracted");
    results.iter().map(to_record).collect()
}
