// src/errors.rs
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(
        "MODEL_DIR is set but not a valid model folder: {}. Expected to find config.json in that directory.",
        path.display()
    )]
    InvalidModelDir { path: PathBuf },

    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Tensor runtime error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Unsupported model architecture '{0}'")]
    UnsupportedArchitecture(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Model is not available. load_error={}", load_error.as_deref().unwrap_or("None"))]
    ModelUnavailable { load_error: Option<String> },
}

impl CheckerError {
    /// Stable name of the failure kind, used when recording load errors.
    pub fn kind(&self) -> &'static str {
        match self {
            CheckerError::Config(_) => "ConfigError",
            CheckerError::InvalidModelDir { .. } => "InvalidModelDir",
            CheckerError::FileRead(_) => "IoError",
            CheckerError::JsonParse(_) => "JsonError",
            CheckerError::Request(_) => "RequestError",
            CheckerError::ApiError { .. } => "ApiError",
            CheckerError::Candle(_) => "CandleError",
            CheckerError::Tokenizer(_) => "TokenizerError",
            CheckerError::UnsupportedArchitecture(_) => "UnsupportedArchitecture",
            CheckerError::Inference(_) => "InferenceError",
            CheckerError::Validation(_) => "ValidationError",
            CheckerError::ModelUnavailable { .. } => "ModelUnavailable",
        }
    }
}

impl ResponseError for CheckerError {
    fn status_code(&self) -> StatusCode {
        match self {
            CheckerError::Validation(_) => StatusCode::BAD_REQUEST,
            CheckerError::ModelUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

pub type Result<T> = std::result::Result<T, CheckerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_message_names_the_load_error() {
        let err = CheckerError::ModelUnavailable {
            load_error: Some("InvalidModelDir: nope".to_string()),
        };
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            err.to_string(),
            "Model is not available. load_error=InvalidModelDir: nope"
        );
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let err = CheckerError::Validation("condition must not be empty".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "ValidationError");
    }
}
