//! Development server: debug routes, optional static files, `/public/` rewrite.

pub mod debug;
pub mod error;
pub mod realtime;
pub mod rewrite;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{extract::Request, response::IntoResponse, routing::get, Json, Router, ServiceExt};
use serde_json::json;
use tower_http::{services::ServeDir, trace::TraceLayer};

pub use debug::DebugState;
pub use error::ApiError;
pub use realtime::{DeliveryError, NotificationChannel, RealtimeEvent, RealtimeHub, EVENT_NOTIFICATION_NEW};
pub use rewrite::{with_rewrite, PrefixRewrite, PUBLIC_PREFIX};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_address: String,
    pub static_dir: Option<PathBuf>,
    pub public_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "127.0.0.1:5173".to_string(),
            static_dir: None,
            public_prefix: PUBLIC_PREFIX.to_string(),
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Routes without the rewrite layer.
pub fn build_app(config: &ServerConfig, channel: Option<Arc<dyn NotificationChannel>>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .merge(debug::routes(DebugState::new(channel)));

    if let Some(dir) = &config.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http())
}

/// Runs the dev server until the process is interrupted.
pub async fn serve(config: ServerConfig, channel: Option<Arc<dyn NotificationChannel>>) -> anyhow::Result<()> {
    let addr: SocketAddr = config
        .listen_address
        .parse()
        .with_context(|| format!("invalid listen address: {}", config.listen_address))?;

    let app = with_rewrite(build_app(&config, channel), &config.public_prefix);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(address = %addr, prefix = %config.public_prefix, "dev server listening");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("server failed")?;
    Ok(())
}
