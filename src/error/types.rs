use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Request-level failures surfaced to HTTP clients.
///
/// Client input errors carry the exact human-readable messages the browser
/// front-end matches on, so the message strings here are part of the wire
/// contract. Upstream model failures are not represented: they are absorbed
/// into the structured result and never become an HTTP error.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Invalid file. Please upload a valid PDF.")]
    InvalidFile,

    #[error("Only PDF files are allowed")]
    InvalidFileType,

    #[error("No text found in PDF")]
    NoTextFound,

    #[error("Missing required fields")]
    MissingFields,

    #[error("{message}")]
    Internal { message: String },
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingFile => "MISSING_FILE",
            AppError::InvalidFile => "INVALID_FILE",
            AppError::InvalidFileType => "INVALID_FILE_TYPE",
            AppError::NoTextFound => "NO_TEXT_FOUND",
            AppError::MissingFields => "MISSING_FIELDS",
            AppError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingFile => StatusCode::BAD_REQUEST,
            AppError::InvalidFile => StatusCode::BAD_REQUEST,
            AppError::InvalidFileType => StatusCode::BAD_REQUEST,
            AppError::NoTextFound => StatusCode::BAD_REQUEST,
            AppError::MissingFields => StatusCode::BAD_REQUEST,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        tracing::error!(
            error_code = error_code,
            status_code = %status,
            error_message = %message,
            "Request failed"
        );

        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

// Convert common errors to AppError
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        AppError::Internal {
            message: format!("Failed to read multipart form: {}", err),
        }
    }
}
