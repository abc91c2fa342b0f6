mod columns;
mod csv_out;
mod error;
pub mod fields;
pub mod geometry;
mod header;
pub mod layout;
pub mod line_items;
pub mod message;
pub mod meter_readings;
mod model;
mod options;
pub mod pipeline;
pub mod rows;
mod table;
pub mod tax_info;
pub mod tax_lines;
pub mod text;
mod warning;

pub use csv_out::{write_csv, write_csv_to_string};
pub use error::ExtractError;
pub use layout::{LayoutId, LayoutRules, Region, detect_layout, regions};
pub use model::{
    CreditInfo, Invoice, InvoiceLineItem, MeterReading, OcrOutput, ReadingDates, Rect, Row,
    TariffFlagPeriod, TaxInfo, TaxLine, Token,
};
pub use options::{ExtractOptions, LayoutMode, load_rules, rules_from_parts};
pub use pipeline::{ExtractionReport, InvoiceBuilder, RecordedOcr, Recognizer, extract_invoice};
pub use warning::{ExtractWarning, WarningCode as ExtractWarningCode};
