use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("recognition failed for region {region}: {message}")]
    Recognizer {
        region: &'static str,
        message: String,
    },

    #[error("invalid option: {0}")]
    InvalidOption(String),
}
