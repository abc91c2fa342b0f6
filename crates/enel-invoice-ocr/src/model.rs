use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Rect {
    #[must_use]
    pub fn x_center(&self) -> f64 {
        (self.x_min + self.x_max) / 2.0
    }

    #[must_use]
    pub fn y_center(&self) -> f64 {
        (self.y_min + self.y_max) / 2.0
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

/// One recognized text fragment. `source_index` is the recognizer's emission
/// order and never takes part in geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub rect: Rect,
    pub source_index: usize,
}

impl Token {
    #[must_use]
    pub fn x_center(&self) -> f64 {
        self.rect.x_center()
    }

    #[must_use]
    pub fn y_center(&self) -> f64 {
        self.rect.y_center()
    }
}

/// Tokens sharing one visual line, left to right.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub tokens: Vec<Token>,
}

impl Row {
    #[must_use]
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|token| token.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Raw output of the recognition engine for one region: three parallel
/// sequences. Boxes are kept as raw JSON so that odd encodings survive
/// deserialization and are judged by the geometry normalizer instead.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OcrOutput {
    #[serde(default)]
    pub texts: Vec<String>,
    #[serde(default)]
    pub boxes: Vec<serde_json::Value>,
    #[serde(default)]
    pub scores: Vec<f64>,
}

impl OcrOutput {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceLineItem {
    pub description: String,
    pub unit: String,
    pub quantity: Decimal,
    pub unit_price_with_taxes: Decimal,
    pub amount: Decimal,
    pub pis_cofins: Decimal,
    pub icms_tax_base: Decimal,
    pub icms_rate: Decimal,
    pub icms_amount: Decimal,
    pub unit_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeterReading {
    pub meter_number: String,
    pub segment_time: String,
    pub reading_date_1: String,
    pub reading_1: Decimal,
    pub reading_date_2: String,
    pub reading_2: Decimal,
    pub multiplier_factor: Decimal,
    pub consumption_kwh: Decimal,
    pub number_of_days: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxLine {
    pub tax_name: String,
    pub base_calc: Decimal,
    pub rate: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TaxInfo {
    pub invoice_number: String,
    pub invoice_issue_date: String,
    pub access_key: String,
    pub cfop: String,
    pub presentation_date: String,
    pub tax_items: Vec<TaxLine>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CreditInfo {
    pub injected_hfp_kwh: f64,
    pub used_kwh: f64,
    pub updated_kwh: f64,
    pub expiring_kwh: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReadingDates {
    pub previous_reading: String,
    pub current_reading: String,
    pub reading_days: i64,
    pub next_reading: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TariffFlagPeriod {
    pub flag: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invoice {
    pub invoice_items: Vec<InvoiceLineItem>,
    pub meter_items: Vec<MeterReading>,
    pub classification_consumer_unit: String,
    pub supply_type: String,
    pub installation_number: String,
    pub customer_number: String,
    pub customer_name: String,
    pub tax_number: String,
    pub lighting_responsible: String,
    pub billing_period: String,
    pub due_date: String,
    pub amount_due: Decimal,
    pub reading_dates: ReadingDates,
    pub tax_info: TaxInfo,
    pub important_message: String,
    pub tariff_flag_periods: Vec<TariffFlagPeriod>,
    pub credit_info: CreditInfo,
}
