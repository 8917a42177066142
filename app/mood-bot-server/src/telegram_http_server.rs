//! Webhook mode: Telegram POSTs updates to us over HTTPS.

use anyhow::{Context, Result};
use axum::{
    extract::State as AxumState,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use mood_bot::config::TelegramConfig;

use crate::telegram_api::Update;
use crate::{dispatch, AppState};

/// Header Telegram echoes the `setWebhook` secret token in.
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

#[derive(Clone)]
struct WebhookState {
    app: AppState,
    secret: Option<Arc<str>>,
}

/// Acknowledge immediately; the bot replies through the Bot API, not the
/// webhook response.
async fn handle_webhook_update(
    AxumState(state): AxumState<WebhookState>,
    headers: HeaderMap,
    Json(update): Json<Update>,
) -> StatusCode {
    if let Some(expected) = &state.secret {
        let presented = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if presented != Some(&**expected) {
            tracing::warn!(update_id = update.update_id, "Rejected webhook update with bad secret token");
            return StatusCode::UNAUTHORIZED;
        }
    }

    tracing::debug!(update_id = update.update_id, "📨 Webhook update");
    dispatch(&state.app, update);
    StatusCode::OK
}

async fn health_check() -> &'static str {
    "Mood bot is running"
}

/// With a `secret`, only updates carrying it in [`SECRET_HEADER`] are handled.
pub fn router(state: AppState, webhook_path: &str, secret: Option<&str>) -> Router {
    let path = format!("/{}", webhook_path.trim_start_matches('/'));
    let state = WebhookState {
        app: state,
        secret: secret.map(Arc::from),
    };
    Router::new()
        .route("/", get(health_check))
        .route(&path, post(handle_webhook_update))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(state: AppState, config: &TelegramConfig) -> Result<()> {
    let webhook_url = config
        .webhook_url()
        .context("Webhook mode requires WEBHOOK_HOST")?;

    let secret = config.webhook_secret.as_deref();
    if secret.is_none() {
        tracing::warn!("No WEBHOOK_SECRET set, webhook accepts unauthenticated updates");
    }

    state
        .telegram
        .set_webhook(&webhook_url, config.skip_pending_updates, secret)
        .await
        .context("Failed to register webhook")?;
    tracing::info!(url = %webhook_url, "✅ Webhook registered");

    let app = router(state.clone(), &config.webhook_path, secret);
    let addr = format!("{}:{}", config.listen_host, config.listen_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("🚀 Webhook server listening on http://{}{}", addr, config.webhook_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await
        .context("Webhook server failed")?;

    tracing::info!("Shutting down, removing webhook");
    if let Err(e) = state.telegram.delete_webhook(false).await {
        tracing::warn!(error = %e, "Failed to remove webhook on shutdown");
    }
    Ok(())
}
