//! Per-user real-time delivery.
//!
//! Handlers receive a [`NotificationChannel`] at construction time instead of
//! reaching into process-wide state. [`RealtimeHub`] is the in-process
//! implementation used by the dev server and the tests.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

/// Event name used for freshly created notifications.
pub const EVENT_NOTIFICATION_NEW: &str = "notification:new";

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("channel id must not be empty")]
    EmptyChannel,

    #[error("delivery to channel '{0}' failed: {1}")]
    Transport(String, String),
}

/// An event as seen by a subscriber of one user's channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealtimeEvent {
    pub event: String,
    pub payload: Value,
}

/// Addressable push delivery, one channel per user id.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn emit(&self, user_id: &str, event: &str, payload: Value) -> Result<(), DeliveryError>;
}

#[derive(Debug, Default)]
pub struct RealtimeHub {
    channels: DashMap<String, broadcast::Sender<RealtimeEvent>>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the channel for `user_id`, creating it on first use.
    pub fn subscribe(&self, user_id: &str) -> broadcast::Receiver<RealtimeEvent> {
        self.channels
            .entry(user_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    pub fn subscriber_count(&self, user_id: &str) -> usize {
        self.channels.get(user_id).map(|s| s.receiver_count()).unwrap_or(0)
    }
}

#[async_trait]
impl NotificationChannel for RealtimeHub {
    async fn emit(&self, user_id: &str, event: &str, payload: Value) -> Result<(), DeliveryError> {
        if user_id.is_empty() {
            return Err(DeliveryError::EmptyChannel);
        }

        let Some(sender) = self.channels.get(user_id).map(|s| s.value().clone()) else {
            // Nobody ever joined; same as emitting into an empty room.
            tracing::debug!(user_id, event, "no channel for user, event dropped");
            return Ok(());
        };

        let message = RealtimeEvent { event: event.to_string(), payload };
        match sender.send(message) {
            Ok(receivers) => tracing::info!(user_id, event, receivers, "event delivered"),
            // All receivers are gone: the room is empty, not an error.
            Err(_) => tracing::debug!(user_id, event, "channel has no live subscribers"),
        }
        Ok(())
    }
}
