use std::fmt::{Display, Formatter};

use enel_invoice_ocr::ExtractError;
use worker::{Response, Result};

use crate::models::ErrorResponse;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Parse(String),
    Validation(String),
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Parse(_) => "parse_error",
            Self::Validation(_) => "validation_error",
            Self::Internal(_) => "internal_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(message)
            | Self::Parse(message)
            | Self::Validation(message)
            | Self::Internal(message) => message,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Parse(_) | Self::Validation(_) => 422,
            Self::Internal(_) => 500,
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.code().to_string(),
            message: self.message().to_string(),
        }
    }

    pub fn into_response(self) -> Result<Response> {
        if self.status_code() >= 500 {
            worker::console_error!("{self}");
        }
        let mut response = Response::from_json(&self.to_error_response())?;
        response.headers_mut().set("Cache-Control", "no-store")?;
        Ok(response.with_status(self.status_code()))
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for ApiError {}

impl From<worker::Error> for ApiError {
    fn from(error: worker::Error) -> Self {
        Self::Internal(error.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        Self::Parse(error.to_string())
    }
}

impl From<ExtractError> for ApiError {
    fn from(error: ExtractError) -> Self {
        match error {
            ExtractError::Json(error) => Self::Parse(error.to_string()),
            ExtractError::InvalidOption(_) => Self::Validation(error.to_string()),
            ExtractError::Io(_) | ExtractError::Csv(_) | ExtractError::Recognizer { .. } => {
                Self::Internal(error.to_string())
            }
        }
    }
}
