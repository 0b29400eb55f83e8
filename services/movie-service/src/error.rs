use axum::{
    extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse,
    response::Response, Json,
};
use thiserror::Error;

use crate::models::{ErrorResponse, FieldError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Outcomes of catalog operations other than success.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("movie not found")]
    NotFound,
    #[error("validation failed for {} field(s)", .0.len())]
    ValidationFailed(Vec<FieldError>),
    #[error("movie was modified by another request")]
    ConcurrentModification,
    #[error("{0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(message) => CatalogError::StoreUnavailable(message),
        }
    }
}

/// HTTP rendering of a failed operation.
pub struct ServiceError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ServiceError {
    pub fn new(status: StatusCode, code: &'static str, message: String) -> Self {
        Self {
            status,
            body: ErrorResponse {
                code,
                message,
                errors: Vec::new(),
            },
        }
    }

    pub fn with_errors(
        status: StatusCode,
        code: &'static str,
        message: String,
        errors: Vec<FieldError>,
    ) -> Self {
        Self {
            status,
            body: ErrorResponse {
                code,
                message,
                errors,
            },
        }
    }
}

impl From<CatalogError> for ServiceError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::NotFound => ServiceError::new(StatusCode::NOT_FOUND, "not_found", message),
            CatalogError::ValidationFailed(errors) => ServiceError::with_errors(
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_failed",
                message,
                errors,
            ),
            CatalogError::ConcurrentModification => {
                ServiceError::new(StatusCode::CONFLICT, "concurrent_modification", message)
            }
            CatalogError::StoreUnavailable(_) => ServiceError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                "service unavailable".to_string(),
            ),
        }
    }
}

/// Bodies that are not a JSON object at all; field-level problems are
/// reported by validation instead.
impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::new(rejection.status(), "invalid_body", rejection.body_text())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Fatal failures while bringing the service up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("bind listener failed: {0}")]
    Bind(#[source] std::io::Error),
    #[error("connect db failed: {0}")]
    Database(#[from] tokio_postgres::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("serve failed: {0}")]
    Serve(#[source] std::io::Error),
}
