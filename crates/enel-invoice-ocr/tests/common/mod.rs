use std::path::Path;

use serde_json::{Value, json};

/// Builds one region's OCR output from `(text, x, y)` cells, each cell a
/// 40x20 box with its top-left corner at `(x, y)`.
pub fn region(cells: &[(&str, f64, f64)]) -> Value {
    let texts = cells.iter().map(|(text, _, _)| *text).collect::<Vec<_>>();
    let boxes = cells
        .iter()
        .map(|(_, x, y)| json!([[x, y], [x + 40.0, y], [x + 40.0, y + 20.0], [x, y + 20.0]]))
        .collect::<Vec<_>>();
    let scores = vec![0.95; cells.len()];
    json!({ "texts": texts, "boxes": boxes, "scores": scores })
}

pub fn texts(values: &[&str]) -> Value {
    json!({ "texts": values })
}

/// Billing description region: a two-line items table followed by the
/// metering section.
pub fn billing_region() -> Value {
    region(&[
        ("DESCRIÇÃO ITENS", 0.0, 0.0),
        ("UNID", 200.0, 0.0),
        ("QUANT", 300.0, 0.0),
        ("PREÇO", 400.0, 0.0),
        ("VALOR", 500.0, 0.0),
        ("ENERGIA ATIVA", 0.0, 40.0),
        ("KWH", 200.0, 40.0),
        ("100", 300.0, 40.0),
        ("0,50", 400.0, 40.0),
        ("50,00", 500.0, 40.0),
        ("TOTAL", 0.0, 80.0),
        ("50,00", 500.0, 80.0),
        ("EQUIPAMENTOS DE MEDIÇÃO E CONSUMO NO PERÍODO", 0.0, 160.0),
        ("MEDIDOR", 0.0, 200.0),
        ("HORÁRIO", 100.0, 200.0),
        ("DATA", 200.0, 200.0),
        ("LEITURA", 300.0, 200.0),
        ("DATA", 400.0, 200.0),
        ("LEITURA", 500.0, 200.0),
        ("FATOR", 600.0, 200.0),
        ("CONSUMO KWH", 700.0, 200.0),
        ("DIAS", 800.0, 200.0),
        ("ABC123", 0.0, 240.0),
        ("Único", 100.0, 240.0),
        ("01/02/2024", 200.0, 240.0),
        ("1.234,5", 300.0, 240.0),
        ("02/03/2024", 400.0, 240.0),
        ("1.334,5", 500.0, 240.0),
        ("1", 600.0, 240.0),
        ("100", 700.0, 240.0),
        ("30", 800.0, 240.0),
    ])
}

pub fn tax_region() -> Value {
    region(&[
        ("TRIBUTOS", 0.0, 0.0),
        ("BASE CALC", 150.0, 0.0),
        ("ALÍQUOTA", 300.0, 0.0),
        ("VALOR", 450.0, 0.0),
        ("ICMS", 0.0, 40.0),
        ("50,00", 150.0, 40.0),
        ("18%", 300.0, 40.0),
        ("9,00", 450.0, 40.0),
    ])
}

/// A recording covering the regions every test invoice needs.
pub fn recording() -> Value {
    json!({
        "DESCRICAO_FATURAMENTO": billing_region(),
        "TRIBUTOS": tax_region(),
        "NUMERO_CLIENTE": texts(&["7001234"]),
        "VALOR_PAGAR": texts(&["Total a pagar", "R$ 59,00"]),
        "DATA_VENCIMENTO": texts(&["15/03/2024"]),
        "MENSAGEM_IMPORTANTE": texts(&["Bandeira tarifária VERDE 01/02 a 29/02"]),
    })
}

pub fn write_json(path: &Path, value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}
