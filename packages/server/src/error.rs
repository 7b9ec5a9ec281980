use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

use crate::catalog::CatalogError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `INVALID_PAYLOAD`,
    /// `MISSING_REQUIRED_FIELD`, `MEDIA_FILE_NOT_FOUND`, `MEDIA_SOURCE_REQUIRED`,
    /// `TOKEN_MISSING`, `TOKEN_INVALID`, `INVALID_CREDENTIALS`, `NOT_FOUND`,
    /// `CONFLICT`, `PAYLOAD_TOO_LARGE`, `INTERNAL_ERROR`.
    #[schema(example = "MISSING_REQUIRED_FIELD")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Missing required field: slug")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    InvalidPayload(String),
    MissingRequiredField(String),
    MediaFileNotFound(String),
    MediaSourceRequired(String),
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    NotFound(String),
    Conflict(String),
    PayloadTooLarge(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        let (status, code, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            AppError::InvalidPayload(msg) => (StatusCode::BAD_REQUEST, "INVALID_PAYLOAD", msg),
            AppError::MissingRequiredField(msg) => {
                (StatusCode::BAD_REQUEST, "MISSING_REQUIRED_FIELD", msg)
            }
            AppError::MediaFileNotFound(msg) => {
                (StatusCode::BAD_REQUEST, "MEDIA_FILE_NOT_FOUND", msg)
            }
            AppError::MediaSourceRequired(msg) => {
                (StatusCode::BAD_REQUEST, "MEDIA_SOURCE_REQUIRED", msg)
            }
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_MISSING",
                "Authentication required".into(),
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_INVALID",
                "Invalid or expired token".into(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password".into(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg)
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred".into(),
                )
            }
        };
        (status, ErrorBody { code, message })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) => AppError::NotFound(format!("Upload '{name}' not found")),
            StorageError::InvalidFilename(_) => AppError::Validation(err.to_string()),
            StorageError::SizeLimitExceeded { .. } => AppError::PayloadTooLarge(err.to_string()),
            StorageError::Io(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidPayload(_) => AppError::InvalidPayload(err.to_string()),
            CatalogError::MissingRequiredField(_) => AppError::MissingRequiredField(err.to_string()),
            CatalogError::MediaFileNotFound(_) => AppError::MediaFileNotFound(err.to_string()),
            CatalogError::MediaSourceRequired(_) => AppError::MediaSourceRequired(err.to_string()),
            CatalogError::Validation(msg) => AppError::Validation(msg),
            CatalogError::UnknownCategory(_) => AppError::Validation(err.to_string()),
            CatalogError::ProductNotFound | CatalogError::CategoryNotFound => {
                AppError::NotFound(err.to_string())
            }
            CatalogError::SlugTaken(_) | CatalogError::CategoryInUse(_) => {
                AppError::Conflict(err.to_string())
            }
            CatalogError::Database(e) => AppError::from(e),
            CatalogError::Storage(e) => AppError::from(e),
        }
    }
}
