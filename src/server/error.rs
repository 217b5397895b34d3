//! Defines the `ApiError` type returned by dev-server handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use super::realtime::DeliveryError;

#[derive(Debug)]
pub enum ApiError {
    /// The request body is missing a field or is not usable.
    BadRequest(String),

    /// No real-time channel was wired into the server.
    ChannelUnavailable,

    /// Anything else; the message is only logged.
    InternalServerError(String),
}

impl From<DeliveryError> for ApiError {
    fn from(err: DeliveryError) -> Self {
        ApiError::InternalServerError(err.to_string())
    }
}

/// Maps handler errors to the JSON bodies clients see. Internal details never
/// leave the server.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            ApiError::ChannelUnavailable => {
                tracing::error!("real-time channel is not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Real-time channel unavailable" }),
                )
            }
            ApiError::InternalServerError(err) => {
                tracing::error!("Internal server error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "An internal server error occurred" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
