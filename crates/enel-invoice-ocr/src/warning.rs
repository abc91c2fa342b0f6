use serde::Serialize;

use crate::layout::LayoutId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    LayoutFallback,
    EmptyRegion,
    NoLineItems,
    NoMeterReadings,
    NoTaxLines,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractWarning {
    pub code: WarningCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutId>,
}

impl ExtractWarning {
    #[must_use]
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            region: None,
            layout: None,
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: &'static str) -> Self {
        self.region = Some(region);
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: LayoutId) -> Self {
        self.layout = Some(layout);
        self
    }
}
