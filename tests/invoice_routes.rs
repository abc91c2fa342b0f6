use std::collections::HashMap;

use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use enel_invoice_ocr::{LayoutId, rules_from_parts};
use enel_invoice_worker::error::ApiError;
use enel_invoice_worker::models::ResponseFormat;
use enel_invoice_worker::routes::{
    build_invoice_response, ensure_json_content_type, line_items_csv, parse_format_query,
    parse_invoice_request, parse_layout_query, regions_response,
};

fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

fn cell(text: &str, x: f64, y: f64) -> (String, Value) {
    (text.to_string(), json!([x, y, x + 40.0, y + 20.0]))
}

fn region(cells: &[(String, Value)]) -> Value {
    let texts = cells.iter().map(|(text, _)| text.clone()).collect::<Vec<_>>();
    let boxes = cells.iter().map(|(_, rect)| rect.clone()).collect::<Vec<_>>();
    json!({ "texts": texts, "boxes": boxes })
}

fn request_body(layout: Option<&str>) -> String {
    let items = region(&[
        cell("DESCRIÇÃO DOS ITENS", 0.0, 0.0),
        cell("UNID", 200.0, 0.0),
        cell("QUANT", 300.0, 0.0),
        cell("PREÇO", 400.0, 0.0),
        cell("VALOR", 500.0, 0.0),
        cell("CONSUMO", 0.0, 40.0),
        cell("KWH", 200.0, 40.0),
        cell("200", 300.0, 40.0),
        cell("0,80", 400.0, 40.0),
        cell("160,00", 500.0, 40.0),
        cell("TOTAL", 0.0, 80.0),
        cell("160,00", 500.0, 80.0),
    ]);
    let mut body = json!({
        "regions": {
            "DESCRICAO_FATURAMENTO": items,
            "NUMERO_INSTALACAO": {"texts": ["0401 / 998877"]},
            "LAYOUT_ANCHOR": {"texts": ["DOCUMENTO AUXILIAR DA NF3E"]}
        }
    });
    if let Some(layout) = layout {
        body["layout"] = json!(layout);
    }
    body.to_string()
}

fn fixed_now() -> DateTime<Utc> {
    "2024-03-01T12:00:00Z".parse().expect("valid datetime")
}

#[test]
fn accepts_only_json_content_type() {
    assert!(ensure_json_content_type(Some("application/json")).is_ok());
    assert!(ensure_json_content_type(Some("Application/JSON; charset=utf-8")).is_ok());

    let error = ensure_json_content_type(Some("application/pdf")).expect_err("pdf is rejected");
    assert_eq!(error.status_code(), 400);
    assert!(ensure_json_content_type(None).is_err());
}

#[test]
fn rejects_empty_and_malformed_requests() {
    let empty = parse_invoice_request("  ").expect_err("empty body is rejected");
    assert_eq!(empty.code(), "bad_request");

    let no_regions = parse_invoice_request(r#"{"regions": {}}"#).expect_err("no regions");
    assert_eq!(no_regions.status_code(), 400);

    let malformed = parse_invoice_request(r#"{"regions": ["x"]}"#).expect_err("bad shape");
    assert!(matches!(malformed, ApiError::Parse(_)));
    assert_eq!(malformed.status_code(), 422);

    let bad_layout = parse_invoice_request(r#"{"layout": "v3", "regions": {"X": {}}}"#)
        .expect_err("unknown layout");
    assert_eq!(bad_layout.status_code(), 422);
}

#[test]
fn builds_invoice_response_with_forced_layout() {
    let request = parse_invoice_request(&request_body(Some("v2"))).expect("request should parse");
    let response =
        build_invoice_response(request, None, fixed_now()).expect("extraction should succeed");

    assert_eq!(response.layout, LayoutId::V2);
    assert_eq!(response.extracted_at, "2024-03-01T12:00:00Z");
    assert_eq!(response.invoice.installation_number, "998877");

    let value = serde_json::to_value(&response).expect("response should serialize");
    assert_eq!(value["layout"], json!("v2"));
    assert_eq!(value["invoice"]["invoice_items"][0]["description"], json!("CONSUMO"));
    assert_eq!(value["invoice"]["invoice_items"][0]["amount"], json!("160.00"));
    assert_eq!(value["invoice"]["invoice_items"][1]["description"], json!("TOTAL"));
}

#[test]
fn detects_layout_from_environment_rules() {
    let rules = rules_from_parts("CONTA DE ENERGIA", "0,0,900,120").expect("rules should build");

    let request = parse_invoice_request(&request_body(None)).expect("request should parse");
    let detected = build_invoice_response(request, Some(&rules), fixed_now())
        .expect("extraction should succeed");
    assert_eq!(detected.layout, LayoutId::V2);

    let request = parse_invoice_request(&request_body(None)).expect("request should parse");
    let fallback =
        build_invoice_response(request, None, fixed_now()).expect("extraction should succeed");
    assert_eq!(fallback.layout, LayoutId::V1);
    assert_eq!(fallback.invoice.installation_number, "0401 / 998877");
    let value = serde_json::to_value(&fallback.warnings).expect("warnings should serialize");
    assert_eq!(value[0]["code"], json!("layout_fallback"));
}

#[test]
fn renders_line_items_as_csv() {
    let request = parse_invoice_request(&request_body(Some("v1"))).expect("request should parse");
    let response =
        build_invoice_response(request, None, fixed_now()).expect("extraction should succeed");

    let csv = line_items_csv(&response.invoice).expect("csv should render");
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some(
            "description,unit,quantity,unit_price_with_taxes,amount,pis_cofins,icms_tax_base,icms_rate,icms_amount,unit_rate"
        )
    );
    assert_eq!(lines.next(), Some("CONSUMO,KWH,200,0.80,160.00,0,0,0,0,0"));
}

#[test]
fn parses_layout_and_format_queries() {
    assert_eq!(parse_layout_query(&query(&[])).expect("default"), LayoutId::V1);
    assert_eq!(
        parse_layout_query(&query(&[("layout", "v2")])).expect("v2"),
        LayoutId::V2
    );
    let error = parse_layout_query(&query(&[("layout", "x")])).expect_err("invalid layout");
    assert_eq!(error.status_code(), 400);

    assert_eq!(
        parse_format_query(&query(&[])).expect("default"),
        ResponseFormat::Json
    );
    assert_eq!(
        parse_format_query(&query(&[("format", "CSV")])).expect("csv"),
        ResponseFormat::Csv
    );
    assert!(parse_format_query(&query(&[("format", "xml")])).is_err());
}

#[test]
fn lists_regions_for_layout() {
    let response = regions_response(LayoutId::V1);
    assert_eq!(response.regions.len(), 17);

    let value = serde_json::to_value(&response).expect("regions should serialize");
    assert_eq!(value["layout"], json!("v1"));
    assert_eq!(
        value["regions"][0],
        json!({
            "name": "CLASSIFICACAO_UNIDADE_CONSUMIDORA",
            "x": 178,
            "y": 328,
            "width": 639,
            "height": 68
        })
    );
}
