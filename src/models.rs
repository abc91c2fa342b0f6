use std::collections::BTreeMap;

use enel_invoice_ocr::{ExtractWarning, Invoice, LayoutId, OcrOutput, Region};
use serde::{Deserialize, Serialize};

pub const LAYOUT_ANCHORS_VAR: &str = "LAYOUT_ANCHORS";
pub const LAYOUT_ANCHOR_REGION_VAR: &str = "LAYOUT_ANCHOR_REGION";

/// OCR output recorded per region, as posted by the recognition front end.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct InvoiceRequest {
    #[serde(default)]
    pub layout: Option<LayoutId>,
    pub regions: BTreeMap<String, OcrOutput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceResponse {
    pub invoice: Invoice,
    pub layout: LayoutId,
    pub warnings: Vec<ExtractWarning>,
    pub extracted_at: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RegionsResponse {
    pub layout: LayoutId,
    pub regions: Vec<Region>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Csv,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}
