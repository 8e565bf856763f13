use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower_http::trace::TraceLayer;

use courier_worker::{
    CourierWorker, DiagnosticsReport, GatewayReply, MessageLog, SendMessageRequest, StatusReply,
    ValidationError, WebhookBatch, WebhookUrlRequest,
};

use crate::error::{ApiError, upstream_status};

type ApiResult<T> = Result<T, ApiError>;

#[derive(Clone)]
pub struct AppState {
    worker: Arc<CourierWorker>,
}

pub fn router(worker: Arc<CourierWorker>) -> Router {
    Router::new()
        .route("/messages", get(list_messages))
        .route("/messages/all", get(list_messages))
        .route("/send-message", post(send_message))
        .route("/webhook", post(webhook))
        .route("/update-webhook", post(update_webhook))
        .route("/setup-webhook", post(setup_webhook))
        .route("/check-webhook", get(check_webhook))
        .route("/test-api", get(test_api))
        .route("/test-messages", get(test_messages))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { worker })
}

// Missing or unparseable bodies read as an empty request and fail validation.
fn lenient<T: DeserializeOwned + Default>(body: &Bytes) -> T {
    serde_json::from_slice(body).unwrap_or_default()
}

fn relay(reply: GatewayReply) -> (StatusCode, Json<Value>) {
    (upstream_status(reply.status), Json(reply.body))
}

async fn list_messages(State(state): State<AppState>) -> ApiResult<Json<MessageLog>> {
    let log = state.worker.list_messages().await?;
    tracing::debug!(count = log.len(), "Serving message log");
    Ok(Json(log))
}

async fn send_message(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<StatusReply>)> {
    let request: SendMessageRequest = lenient(&body);
    let outcome = state.worker.send_message(&request).await?;

    let reply = StatusReply::success()
        .with_message("message sent")
        .with_data(outcome.reply.body)
        .with_stored(outcome.stored);
    Ok((upstream_status(outcome.reply.status), Json(reply)))
}

async fn webhook(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<StatusReply>> {
    let batch: WebhookBatch = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Rejected webhook payload");
        ValidationError::MalformedWebhook
    })?;
    tracing::debug!(payload = %String::from_utf8_lossy(&body), "Webhook received");

    state.worker.ingest_webhook(batch).await?;
    Ok(Json(StatusReply::success()))
}

async fn update_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let request: WebhookUrlRequest = lenient(&body);
    Ok(relay(state.worker.update_webhook(&request).await?))
}

async fn setup_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<StatusReply>> {
    let request: WebhookUrlRequest = lenient(&body);
    let reply = state.worker.setup_webhook(&request).await?;
    Ok(Json(
        StatusReply::success()
            .with_message("webhook configured")
            .with_data(reply.body),
    ))
}

async fn check_webhook(State(state): State<AppState>) -> ApiResult<(StatusCode, Json<Value>)> {
    Ok(relay(state.worker.webhook().await?))
}

async fn test_api(State(state): State<AppState>) -> ApiResult<Json<StatusReply>> {
    let reply = state.worker.probe_api().await?;
    Ok(Json(StatusReply::success().with_data(reply.body)))
}

async fn test_messages(State(state): State<AppState>) -> ApiResult<Json<DiagnosticsReport>> {
    Ok(Json(state.worker.diagnostics().await?))
}
