use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

use curation::{CurationError, StoreError};

pub type ApiError = (StatusCode, Json<Value>);

pub fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": msg.into() })))
}

pub fn from_curation(e: CurationError) -> ApiError {
    match e {
        CurationError::UnsupportedType(e) => api_error(StatusCode::BAD_REQUEST, e.to_string()),
        CurationError::Store(StoreError::NotFound(_)) => {
            api_error(StatusCode::NOT_FOUND, "Entry not found")
        }
        other => {
            tracing::error!(error = %other, "curation operation failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

pub fn from_join(e: tokio::task::JoinError) -> ApiError {
    tracing::error!(error = %e, "store task failed");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
