use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::storage::StorageError;

/// The service-level error taxonomy. Everything a handler can fail with
/// maps onto one of these; the `ResponseError` impl turns them into
/// JSON error bodies with the right status.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The code resolved against no kind. The message stays generic;
    /// callers never learn which kinds were probed.
    #[error("Short link not found or expired")]
    NotFound,
    /// The allocator spent its retry budget. Retryable.
    #[error("Could not allocate a unique short code, please retry")]
    AllocationExhausted,
    /// Missing, unknown or inactive credential.
    #[error("Invalid or inactive API token")]
    Unauthorized,
    /// Valid credential, wrong scope.
    #[error("Token is not authorized for this link type")]
    Forbidden,
    #[error("Invalid episode range: from {from} to {to}")]
    InvalidRange { from: i32, to: i32 },
    #[error("{0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::AllocationExhausted => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::InvalidRange { .. } | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Storage(err) = self {
            log::error!("storage error: {}", err);
        }
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}
