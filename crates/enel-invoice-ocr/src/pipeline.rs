//! Region-by-region assembly of an [`Invoice`].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::fields;
use crate::geometry::tokens_from_ocr;
use crate::layout::{self, LayoutId, Region, detect_layout, regions};
use crate::line_items;
use crate::message;
use crate::meter_readings;
use crate::model::{
    CreditInfo, Invoice, InvoiceLineItem, MeterReading, OcrOutput, ReadingDates, TaxInfo, TaxLine,
};
use crate::options::{ExtractOptions, LayoutMode};
use crate::tax_info;
use crate::tax_lines;
use crate::warning::{ExtractWarning, WarningCode};

/// The text recognition engine, seen as a function from a page region to its
/// recognized fragments.
pub trait Recognizer {
    fn recognize(&self, region: &Region) -> Result<OcrOutput, ExtractError>;
}

/// Recognition results recorded ahead of time, keyed by region name. Regions
/// without a record come back empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordedOcr {
    regions: BTreeMap<String, OcrOutput>,
}

impl RecordedOcr {
    #[must_use]
    pub fn new(regions: BTreeMap<String, OcrOutput>) -> Self {
        Self { regions }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ExtractError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn insert(&mut self, name: impl Into<String>, output: OcrOutput) {
        self.regions.insert(name.into(), output);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl Recognizer for RecordedOcr {
    fn recognize(&self, region: &Region) -> Result<OcrOutput, ExtractError> {
        Ok(self.regions.get(region.name).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionReport {
    pub layout: LayoutId,
    pub regions_recognized: usize,
    pub warnings: Vec<ExtractWarning>,
}

/// Accumulates the fields mapped from each region. Every region writes only
/// its own fields; [`InvoiceBuilder::finish`] derives the rest.
#[derive(Debug, Default)]
pub struct InvoiceBuilder {
    layout: LayoutId,
    invoice_items: Vec<InvoiceLineItem>,
    meter_items: Vec<MeterReading>,
    tax_lines: Vec<TaxLine>,
    tax_info: Option<TaxInfo>,
    classification_consumer_unit: String,
    supply_type: String,
    installation_number: String,
    customer_number: String,
    customer_name: String,
    tax_number: String,
    lighting_responsible: String,
    billing_period: String,
    due_date: String,
    amount_due: Decimal,
    reading_dates: ReadingDates,
    important_message: String,
}

impl InvoiceBuilder {
    #[must_use]
    pub fn new(layout: LayoutId) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Maps one region's recognition output. Returns `false` for region
    /// names that feed no field.
    pub fn apply(&mut self, region: &str, output: &OcrOutput) -> bool {
        let texts = output.texts.as_slice();
        match region {
            layout::DESCRICAO_FATURAMENTO => {
                let tokens = tokens_from_ocr(output);
                self.invoice_items = line_items::extract(&tokens);
                self.meter_items = meter_readings::extract(&tokens);
            }
            layout::TRIBUTOS => self.tax_lines = tax_lines::extract(&tokens_from_ocr(output)),
            layout::INFORMACOES_TRIBUTARIAS => {
                self.tax_info = Some(tax_info::extract(&tokens_from_ocr(output)));
            }
            layout::CLASSIFICACAO_UNIDADE_CONSUMIDORA => {
                self.classification_consumer_unit = fields::first_item(texts);
            }
            layout::TIPO_FORNECIMENTO => self.supply_type = fields::first_item(texts),
            layout::NUMERO_INSTALACAO => {
                self.installation_number = fields::identifier(texts, self.layout);
            }
            layout::NUMERO_CLIENTE => self.customer_number = fields::identifier(texts, self.layout),
            layout::PERIODO_FATURAMENTO => self.billing_period = fields::billing_period(texts),
            layout::DATA_VENCIMENTO => self.due_date = fields::due_date(texts),
            layout::VALOR_PAGAR => self.amount_due = fields::amount_due(texts),
            layout::LEITURA_ATUAL => self.reading_dates.current_reading = fields::first_item(texts),
            layout::LEITURA_ANTERIOR => {
                self.reading_dates.previous_reading = fields::first_item(texts);
            }
            layout::PROXIMA_LEITURA => self.reading_dates.next_reading = fields::first_item(texts),
            layout::DIAS_LEITURA => self.reading_dates.reading_days = fields::reading_days(texts),
            layout::DADOS_PESSOAIS => {
                (self.customer_name, self.tax_number) = fields::personal_data(texts);
            }
            layout::RESPONSAVEL_PELA_ILUMINACAO => {
                self.lighting_responsible = fields::joined_text(texts);
            }
            layout::MENSAGEM_IMPORTANTE => self.important_message = fields::joined_text(texts),
            other => {
                tracing::debug!(region = other, "no mapper for region");
                return false;
            }
        }
        true
    }

    #[must_use]
    pub fn finish(self) -> Invoice {
        let (tariff_flag_periods, credit_info) = if self.important_message.is_empty() {
            (Vec::new(), CreditInfo::default())
        } else {
            (
                message::tariff_flags(&self.important_message),
                message::credit_info(&self.important_message),
            )
        };

        let tax_info = TaxInfo {
            tax_items: self.tax_lines,
            ..self.tax_info.unwrap_or_default()
        };

        Invoice {
            invoice_items: self.invoice_items,
            meter_items: self.meter_items,
            classification_consumer_unit: self.classification_consumer_unit,
            supply_type: self.supply_type,
            installation_number: self.installation_number,
            customer_number: self.customer_number,
            customer_name: self.customer_name,
            tax_number: self.tax_number,
            lighting_responsible: self.lighting_responsible,
            billing_period: self.billing_period,
            due_date: self.due_date,
            amount_due: self.amount_due,
            reading_dates: self.reading_dates,
            tax_info,
            important_message: self.important_message,
            tariff_flag_periods,
            credit_info,
        }
    }
}

fn resolve_layout(
    recognizer: &dyn Recognizer,
    options: &ExtractOptions,
    warnings: &mut Vec<ExtractWarning>,
) -> Result<LayoutId, ExtractError> {
    if let LayoutMode::Fixed(layout) = options.layout {
        return Ok(layout);
    }

    let Some((rules, anchor_region)) = options
        .rules
        .as_ref()
        .and_then(|rules| rules.anchor_region().map(|region| (rules, region)))
    else {
        tracing::warn!("layout rules missing or unusable, defaulting to v1");
        warnings.push(
            ExtractWarning::new(
                WarningCode::LayoutFallback,
                "no usable layout rules; assumed the first layout",
            )
            .with_layout(LayoutId::V1),
        );
        return Ok(LayoutId::V1);
    };

    let output = recognizer.recognize(&anchor_region)?;
    let layout = detect_layout(&output.texts, rules);
    tracing::debug!(%layout, anchor_texts = output.texts.len(), "layout detected");
    Ok(layout)
}

fn absence_warnings(invoice: &Invoice, warnings: &mut Vec<ExtractWarning>) {
    if invoice.invoice_items.is_empty() {
        warnings.push(
            ExtractWarning::new(WarningCode::NoLineItems, "no line items were extracted")
                .with_region(layout::DESCRICAO_FATURAMENTO),
        );
    }
    if invoice.meter_items.is_empty() {
        warnings.push(
            ExtractWarning::new(
                WarningCode::NoMeterReadings,
                "no meter readings were extracted",
            )
            .with_region(layout::DESCRICAO_FATURAMENTO),
        );
    }
    if invoice.tax_info.tax_items.is_empty() {
        warnings.push(
            ExtractWarning::new(WarningCode::NoTaxLines, "no tax lines were extracted")
                .with_region(layout::TRIBUTOS),
        );
    }
}

/// Resolves the layout, recognizes every region of it and assembles the
/// invoice. Missing structure never fails extraction; it shows up as empty
/// fields plus warnings in the report.
pub fn extract_invoice(
    recognizer: &dyn Recognizer,
    options: &ExtractOptions,
) -> Result<(Invoice, ExtractionReport), ExtractError> {
    let mut warnings = Vec::new();
    let layout = resolve_layout(recognizer, options, &mut warnings)?;

    let mut builder = InvoiceBuilder::new(layout);
    let mut regions_recognized = 0;
    for region in regions(layout) {
        let output = recognizer.recognize(&region)?;
        if output.is_empty() {
            warnings.push(
                ExtractWarning::new(WarningCode::EmptyRegion, "region produced no text")
                    .with_region(region.name),
            );
        } else {
            regions_recognized += 1;
        }
        builder.apply(region.name, &output);
    }

    let invoice = builder.finish();
    absence_warnings(&invoice, &mut warnings);

    Ok((
        invoice,
        ExtractionReport {
            layout,
            regions_recognized,
            warnings,
        },
    ))
}
