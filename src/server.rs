//! HTTP surface: LINE webhook callback and a health check.

use crate::adapters::line::{self, SIGNATURE_HEADER};
use crate::core::bot::ReportBot;
use crate::core::replies;
use crate::domain::ports::{Messenger, ReportSink};
use crate::utils::error::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct AppState<S: ReportSink, M: Messenger> {
    pub bot: ReportBot<S>,
    pub messenger: M,
    pub channel_secret: String,
}

pub fn router<S, M>(state: AppState<S, M>, callback_path: &str) -> Router
where
    S: ReportSink + 'static,
    M: Messenger + 'static,
{
    Router::new()
        .route(callback_path, post(callback::<S, M>))
        .route("/health", get(health))
        .with_state(Arc::new(state))
}

pub async fn serve(host: &str, port: u16, app: Router) -> Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    tracing::info!("🚀 Webhook server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn callback<S, M>(
    State(state): State<Arc<AppState<S, M>>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse
where
    S: ReportSink + 'static,
    M: Messenger + 'static,
{
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        tracing::warn!("Webhook request without {} header", SIGNATURE_HEADER);
        return (StatusCode::BAD_REQUEST, "missing signature");
    };

    if let Err(e) = line::verify_signature(&state.channel_secret, signature, &body) {
        tracing::warn!("🔒 {}", e);
        return (StatusCode::BAD_REQUEST, "invalid signature");
    }

    let payload = match line::parse_payload(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("{}", e);
            return (StatusCode::BAD_REQUEST, "malformed payload");
        }
    };

    tracing::debug!("Webhook delivered {} event(s)", payload.events.len());

    for event in &payload.events {
        let Some(message) = event.as_text_message() else {
            tracing::debug!("Ignoring {} event", event.event_type);
            continue;
        };

        let received_at = chrono::Local::now().naive_local();
        let Some(kind) = state.bot.handle_text(message.text, received_at).await else {
            continue;
        };

        tracing::info!(
            user = message.user_id.unwrap_or("unknown"),
            reply = ?kind,
            "💬 Replying to report command"
        );
        if let Err(e) = state
            .messenger
            .reply(message.reply_token, replies::render(kind))
            .await
        {
            tracing::error!("❌ Failed to send reply: {}", e);
        }
    }

    (StatusCode::OK, "OK")
}
