use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to bind to {1}: {0}")]
    Bind(std::io::Error, String),
    #[error("Server Error: {0}")]
    Serve(std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// Raised when the uploaded bytes cannot become a pixel grid
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Image payload is empty")]
    Empty,
    #[error("Image payload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Decoded image has zero width or height")]
    ZeroDimensions,
}

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("{0}")]
    Decode(#[from] DecodeError),
    #[error("Classification task failed: {0}")]
    Worker(String),
}

// HTTP-facing errors, rendered as `{"error": "..."}`
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No image uploaded")]
    MissingImage,
    #[error("Invalid image format")]
    InvalidImage(#[source] DecodeError),
    #[error("Invalid request")]
    InvalidRequest,
    #[error("Image too large")]
    TooLarge(String),
    #[error("Malformed upload: {message}")]
    Multipart { status: StatusCode, message: String },
    #[error("Classification failed")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingImage | ApiError::InvalidImage(_) | ApiError::InvalidRequest => {
                StatusCode::BAD_REQUEST
            }
            ApiError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Multipart { status, .. } => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DetectorError> for ApiError {
    fn from(err: DetectorError) -> Self {
        match err {
            DetectorError::Decode(e @ DecodeError::TooLarge { .. }) => {
                ApiError::TooLarge(e.to_string())
            }
            DetectorError::Decode(e) => ApiError::InvalidImage(e),
            DetectorError::Worker(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::TooLarge(err.body_text());
        }
        ApiError::Multipart {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::InvalidImage(cause) => tracing::warn!("Rejected upload: {}", cause),
            ApiError::TooLarge(cause) => tracing::warn!("Rejected upload: {}", cause),
            ApiError::Internal(cause) => tracing::error!("Classification failed: {}", cause),
            other => tracing::warn!("Rejected request: {}", other),
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
