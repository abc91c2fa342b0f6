//! Tax lines of the "tributos" box.

use crate::columns::assign_row;
use crate::header::{HeaderRule, row_extends_header};
use crate::model::{TaxLine, Token};
use crate::table::{AssignedRow, ColumnDef, TableSpec, locate};
use crate::text::{normalize_lower, parse_decimal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Column {
    TaxName,
    BaseCalc,
    Rate,
    Amount,
}

pub(crate) const SPEC: TableSpec<Column> = TableSpec {
    name: "tax_lines",
    columns: &[
        ColumnDef {
            column: Column::TaxName,
            aliases: &["tributos"],
        },
        ColumnDef {
            column: Column::BaseCalc,
            aliases: &["base", "calc"],
        },
        ColumnDef {
            column: Column::Rate,
            aliases: &["aliquota"],
        },
        ColumnDef {
            column: Column::Amount,
            aliases: &["valor"],
        },
    ],
    keywords: &["tributos", "base", "calc", "aliquota", "valor"],
    header: HeaderRule {
        min_hits: 2,
        primary: &["tributos"],
        short_row_tokens: Some(2),
    },
    required: Column::TaxName,
    rightmost_anchor: None,
    midpoint_fallback: None,
    section_titles: &[],
    fold_header_continuation: true,
};

fn cell(row: &AssignedRow<Column>, column: Column) -> &str {
    row.get(&column).map_or("", String::as_str)
}

fn keep_row(row: &AssignedRow<Column>) -> bool {
    let name = normalize_lower(cell(row, Column::TaxName));
    if name.is_empty() && row.values().all(String::is_empty) {
        return false;
    }
    !SPEC.keywords.contains(&name.as_str())
}

fn to_record(row: &AssignedRow<Column>) -> TaxLine {
    TaxLine {
        tax_name: cell(row, Column::TaxName).to_uppercase(),
        base_calc: parse_decimal(cell(row, Column::BaseCalc)),
        rate: parse_decimal(cell(row, Column::Rate)),
        amount: parse_decimal(cell(row, Column::Amount)),
    }
}

/// Extracts tax lines. Header fragments repeated among the body rows are
/// skipped, as are rows whose name is only a header keyword.
#[must_use]
pub fn extract(tokens: &[Token]) -> Vec<TaxLine> {
    let Some(table) = locate(&SPEC, tokens) else {
        return Vec::new();
    };

    let lines = table
        .body()
        .iter()
        .filter(|row| !row_extends_header(row, SPEC.keywords))
        .map(|row| assign_row(&SPEC, &table.positions, &row.tokens))
        .filter(keep_row)
        .map(|row| to_record(&row))
        .collect::<Vec<_>>();

    tracing::debug!(lines = lines.len(), "tax lines extracted");
    lines
}
