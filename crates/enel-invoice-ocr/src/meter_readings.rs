//! Meter readings ("equipamentos de medição e consumo no período").

use crate::columns::assign_row;
use crate::header::HeaderRule;
use crate::model::{MeterReading, Token};
use crate::table::{AssignedRow, ColumnDef, TableSpec, locate};
use crate::text::{format_date, parse_decimal, parse_int};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Column {
    MeterNumber,
    SegmentTime,
    ReadingDate1,
    Reading1,
    ReadingDate2,
    Reading2,
    MultiplierFactor,
    ConsumptionKwh,
    NumberOfDays,
}

pub(crate) const SPEC: TableSpec<Column> = TableSpec {
    name: "meter_readings",
    columns: &[
        ColumnDef {
            column: Column::MeterNumber,
            aliases: &["medidor"],
        },
        ColumnDef {
            column: Column::SegmentTime,
            aliases: &["horario", "segmento"],
        },
        ColumnDef {
            column: Column::ReadingDate1,
            aliases: &["data"],
        },
        ColumnDef {
            column: Column::Reading1,
            aliases: &["leitura"],
        },
        ColumnDef {
            column: Column::ReadingDate2,
            aliases: &["data"],
        },
        ColumnDef {
            column: Column::Reading2,
            aliases: &["leitura"],
        },
        ColumnDef {
            column: Column::MultiplierFactor,
            aliases: &["fator", "multiplicador"],
        },
        ColumnDef {
            column: Column::ConsumptionKwh,
            aliases: &["consumo", "kwh"],
        },
        ColumnDef {
            column: Column::NumberOfDays,
            aliases: &["dias"],
        },
    ],
    keywords: &[
        "medidor",
        "horario",
        "segmento",
        "data",
        "leitura",
        "fator",
        "multiplicador",
        "consumo",
        "kwh",
        "dias",
    ],
    header: HeaderRule {
        min_hits: 3,
        primary: &["medidor"],
        short_row_tokens: None,
    },
    required: Column::MeterNumber,
    rightmost_anchor: None,
    midpoint_fallback: None,
    section_titles: &["equipamentos de medicao e consumo no periodo"],
    fold_header_continuation: false,
};

fn cell(row: &AssignedRow<Column>, column: Column) -> &str {
    row.get(&column).map_or("", String::as_str)
}

fn to_record(row: &AssignedRow<Column>) -> MeterReading {
    MeterReading {
        meter_number: cell(row, Column::MeterNumber).to_uppercase(),
        segment_time: cell(row, Column::SegmentTime).to_uppercase(),
        reading_date_1: format_date(cell(row, Column::ReadingDate1)).to_uppercase(),
        reading_1: parse_decimal(cell(row, Column::Reading1)),
        reading_date_2: format_date(cell(row, Column::ReadingDate2)).to_uppercase(),
        reading_2: parse_decimal(cell(row, Column::Reading2)),
        multiplier_factor: parse_decimal(cell(row, Column::MultiplierFactor)),
        consumption_kwh: parse_decimal(cell(row, Column::ConsumptionKwh)),
        number_of_days: parse_int(cell(row, Column::NumberOfDays)),
    }
}

/// Extracts meter readings. The table is only searched below its section
/// title; rows naming neither a meter nor a time segment are dropped.
#[must_use]
pub fn extract(tokens: &[Token]) -> Vec<MeterReading> {
    let Some(table) = locate(&SPEC, tokens) else {
        return Vec::new();
    };

    let readings = table
        .body()
        .iter()
        .map(|row| assign_row(&SPEC, &table.positions, &row.tokens))
        .filter(|row| {
            !cell(row, Column::MeterNumber).is_empty() || !cell(row, Column::SegmentTime).is_empty()
        })
        .map(|row| to_record(&row))
        .collect::<Vec<_>>();

    tracing::debug!(readings = readings.len(), "meter readings extracted");
    readings
}
