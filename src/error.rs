//! Error types for training, prediction and startup configuration.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::shared_data::{CategoricalField, ErrorResponse};

/// A categorical value that was not part of the vocabulary learned at training time.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Found unknown category '{value}' for field '{field}' (known: {})", .known.join(", "))]
pub struct UnknownCategory {
    pub field: CategoricalField,
    pub value: String,
    pub known: Vec<String>,
}

/// Fatal errors while building the model at startup.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Cannot open dataset '{path}': {source}")]
    DatasetIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset contains no rows")]
    EmptyDataset,

    #[error("Row {row}: column '{column}' is not a finite number")]
    NonFinite { row: usize, column: &'static str },

    #[error("Least squares solve failed: {0}")]
    Solve(String),

    #[error("Encoding failed: {0}")]
    Encoding(#[from] UnknownCategory),

    #[error("Test fraction must be in (0, 1), got {0}")]
    InvalidSplit(f64),

    #[error("Holdout evaluation failed: {0}")]
    Evaluation(String),
}

/// Per-request errors. Everything but `Inference` is the client's fault.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Content-Type must be application/json")]
    UnsupportedMediaType(String),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategory),

    #[error("Predicted traffic volume {0:e} does not fit in a 64-bit integer")]
    OutOfRange(f64),

    #[error("Inference failed: {0}")]
    Inference(String),
}

impl PredictionError {
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PredictionError::Inference(_))
    }
}

impl ResponseError for PredictionError {
    fn status_code(&self) -> StatusCode {
        match self {
            PredictionError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            PredictionError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got '{0}'")]
    InvalidPort(String),
}
