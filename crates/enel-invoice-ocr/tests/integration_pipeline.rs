mod common;

use std::process::Command;

use enel_invoice_ocr::{
    ExtractOptions, ExtractWarningCode, LayoutId, LayoutMode, RecordedOcr, extract_invoice,
};
use serde_json::{Value, json};
use tempfile::tempdir;

fn recorded(value: &Value) -> RecordedOcr {
    serde_json::from_value(value.clone()).expect("recording should deserialize")
}

#[test]
fn assembles_invoice_from_recorded_regions() {
    let (invoice, report) = extract_invoice(&recorded(&common::recording()), &ExtractOptions::default())
        .expect("extraction should succeed");

    let descriptions = invoice
        .invoice_items
        .iter()
        .map(|item| item.description.as_str())
        .collect::<Vec<_>>();
    assert_eq!(descriptions, vec!["ENERGIA ATIVA", "TOTAL"]);
    assert_eq!(invoice.invoice_items[0].unit, "KWH");

    assert_eq!(invoice.meter_items.len(), 1);
    assert_eq!(invoice.meter_items[0].meter_number, "ABC123");
    assert_eq!(invoice.meter_items[0].segment_time, "ÚNICO");
    assert_eq!(invoice.meter_items[0].number_of_days, 30);

    assert_eq!(invoice.tax_info.tax_items.len(), 1);
    assert_eq!(invoice.tax_info.tax_items[0].tax_name, "ICMS");
    assert_eq!(invoice.customer_number, "7001234");
    assert_eq!(invoice.due_date, "15-03-2024");
    assert_eq!(invoice.tariff_flag_periods.len(), 1);

    assert_eq!(report.layout, LayoutId::V1);
    assert_eq!(report.regions_recognized, 6);
    assert!(
        report
            .warnings
            .iter()
            .all(|warning| warning.code != ExtractWarningCode::NoLineItems),
        "report: {report:?}"
    );
}

#[test]
fn invoice_serializes_decimals_as_strings() {
    let (invoice, _) = extract_invoice(
        &recorded(&common::recording()),
        &ExtractOptions::default().with_layout(LayoutMode::Fixed(LayoutId::V1)),
    )
    .expect("extraction should succeed");

    let value = serde_json::to_value(&invoice).expect("invoice should serialize");
    assert_eq!(value["amount_due"], json!("59.00"));
    assert_eq!(value["invoice_items"][0]["amount"], json!("50.00"));
    assert_eq!(value["tax_info"]["tax_items"][0]["rate"], json!("18"));
    assert_eq!(value["credit_info"]["used_kwh"], json!(0.0));
}

#[test]
fn malformed_regions_degrade_to_empty_tables() {
    let recording = json!({
        "DESCRICAO_FATURAMENTO": {
            "texts": ["DESCRICAO", "UNID", "VALOR"],
            "boxes": [[1, 2, 3], "bad", null],
            "scores": []
        },
        "TRIBUTOS": {"texts": ["TRIBUTOS"]}
    });

    let (invoice, report) = extract_invoice(&recorded(&recording), &ExtractOptions::default())
        .expect("extraction should succeed");
    assert!(invoice.invoice_items.is_empty());
    assert!(invoice.tax_info.tax_items.is_empty());
    let codes = report
        .warnings
        .iter()
        .map(|warning| warning.code)
        .collect::<Vec<_>>();
    assert!(codes.contains(&ExtractWarningCode::NoLineItems));
    assert!(codes.contains(&ExtractWarningCode::NoTaxLines));
}

#[test]
fn cli_writes_invoice_json() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("recording.json");
    let output = dir.path().join("invoice.json");
    common::write_json(&input, &common::recording()).expect("recording should be written");

    let status = Command::new(env!("CARGO_BIN_EXE_invoice2json"))
        .args([
            "extract",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &output.to_string_lossy(),
            "--layout",
            "v1",
        ])
        .status()
        .expect("CLI should run");
    assert_eq!(status.code(), Some(0));

    let written = std::fs::read_to_string(&output).expect("output should be readable");
    let invoice: Value = serde_json::from_str(&written).expect("output should be JSON");
    assert_eq!(invoice["invoice_items"][0]["description"], json!("ENERGIA ATIVA"));
}

#[test]
fn cli_writes_line_items_csv() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("recording.json");
    let output = dir.path().join("items.csv");
    common::write_json(&input, &common::recording()).expect("recording should be written");

    let status = Command::new(env!("CARGO_BIN_EXE_invoice2json"))
        .args([
            "extract",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &output.to_string_lossy(),
            "--format",
            "csv",
        ])
        .status()
        .expect("CLI should run");
    assert_eq!(status.code(), Some(0));

    let csv = std::fs::read_to_string(&output).expect("CSV should be readable");
    assert!(
        csv.starts_with("description,unit,quantity,unit_price_with_taxes,amount,"),
        "unexpected CSV output: {csv:?}"
    );
    assert!(csv.contains("ENERGIA ATIVA,KWH,100,0.50,50.00"), "unexpected CSV output: {csv:?}");
}

#[test]
fn cli_table_command_writes_tax_lines() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("tributos.json");
    let output = dir.path().join("taxes.csv");
    common::write_json(&input, &common::tax_region()).expect("region should be written");

    let status = Command::new(env!("CARGO_BIN_EXE_invoice2json"))
        .args([
            "table",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &output.to_string_lossy(),
            "--kind",
            "tax-lines",
        ])
        .status()
        .expect("CLI should run");
    assert_eq!(status.code(), Some(0));

    let csv = std::fs::read_to_string(&output).expect("CSV should be readable");
    assert_eq!(csv, "tax_name,base_calc,rate,amount\nICMS,50.00,18,9.00\n");
}

#[test]
fn cli_exits_with_code_2_when_no_line_items() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("empty.json");
    let output = dir.path().join("empty.json.out");
    common::write_json(&input, &json!({})).expect("recording should be written");

    let status = Command::new(env!("CARGO_BIN_EXE_invoice2json"))
        .args([
            "extract",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &output.to_string_lossy(),
        ])
        .status()
        .expect("CLI should run");

    assert_eq!(status.code(), Some(2));
}

#[test]
fn cli_rejects_unknown_layout() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("recording.json");
    let output = dir.path().join("invoice.json");
    common::write_json(&input, &common::recording()).expect("recording should be written");

    let status = Command::new(env!("CARGO_BIN_EXE_invoice2json"))
        .args([
            "extract",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &output.to_string_lossy(),
            "--layout",
            "v7",
        ])
        .status()
        .expect("CLI should run");

    assert_eq!(status.code(), Some(1));
}
