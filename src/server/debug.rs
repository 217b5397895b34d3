//! Development-only debug routes. Nothing here is authenticated.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use serde_json::{json, Value};

use super::error::ApiError;
use super::realtime::{NotificationChannel, EVENT_NOTIFICATION_NEW};

pub const EMIT_PATH: &str = "/debug/emit-notif";

/// State for the debug routes. The channel is injected by whoever builds the
/// router; `None` means the server runs without real-time delivery.
#[derive(Clone, Default)]
pub struct DebugState {
    pub channel: Option<Arc<dyn NotificationChannel>>,
}

impl DebugState {
    pub fn new(channel: Option<Arc<dyn NotificationChannel>>) -> Self {
        Self { channel }
    }
}

/// Validated body of an emit request.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitRequest {
    pub to_user_id: String,
    pub payload: Value,
}

impl EmitRequest {
    /// Parse `{toUserId, payload}` from raw bytes.
    ///
    /// `toUserId` may be a string or a number; `payload` may be any JSON value
    /// except `null`.
    pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|_| ApiError::BadRequest("request body must be a JSON object".to_string()))?;
        let Value::Object(mut fields) = value else {
            return Err(ApiError::BadRequest("request body must be a JSON object".to_string()));
        };

        let to_user_id = match fields.remove("toUserId") {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(ApiError::BadRequest("toUserId is required".to_string())),
        };

        let payload = match fields.remove("payload") {
            Some(Value::Null) | None => return Err(ApiError::BadRequest("payload is required".to_string())),
            Some(v) => v,
        };

        Ok(Self { to_user_id, payload })
    }
}

/// Push `payload` to the `toUserId` channel as a `notification:new` event.
pub async fn emit_notification(
    State(state): State<DebugState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request = EmitRequest::parse(&body)?;
    let channel = state.channel.as_ref().ok_or(ApiError::ChannelUnavailable)?;

    tracing::debug!(user_id = %request.to_user_id, "debug emit requested");
    channel.emit(&request.to_user_id, EVENT_NOTIFICATION_NEW, request.payload).await?;

    Ok((StatusCode::OK, Json(json!({ "success": true }))))
}

pub fn routes(state: DebugState) -> Router {
    Router::new().route(EMIT_PATH, post(emit_notification)).with_state(state)
}
