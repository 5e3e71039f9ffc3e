//! API Error Types
//!
//! Every failure a handler can hit maps to a distinct status code and a
//! short diagnostic message on the wire; the underlying cause is logged
//! here so nothing is silently absorbed.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use crate::server::artifacts::StoreError;
use crate::server::version::DescriptorError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The update-check header was absent or empty.
    #[error("Firmware version not specified")]
    MissingVersion,

    /// The header was present but not a parsable descriptor.
    #[error("Invalid firmware version")]
    InvalidDescriptor(#[from] DescriptorError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Log submission without `id` or `content`.
    #[error("id and content are required")]
    MissingLogField,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MissingVersion => {
                (StatusCode::BAD_REQUEST, "Firmware version not specified").into_response()
            }
            ApiError::InvalidDescriptor(cause) => {
                tracing::warn!(%cause, "rejected version descriptor");
                (StatusCode::BAD_REQUEST, "Invalid firmware version").into_response()
            }
            ApiError::Store(StoreError::NotFound(name)) => {
                tracing::info!(artifact = %name, "firmware not found");
                (StatusCode::NOT_FOUND, "Firmware not found").into_response()
            }
            ApiError::Store(StoreError::Io(cause)) => internal(cause),
            ApiError::MissingLogField => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "id and content are required" })),
            )
                .into_response(),
            ApiError::Io(cause) => internal(cause),
        }
    }
}

fn internal(cause: std::io::Error) -> Response {
    tracing::error!(%cause, "request failed on IO");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": cause.to_string() })),
    )
        .into_response()
}
