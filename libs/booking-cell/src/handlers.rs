use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use messaging_cell::models::WebhookPayload;
use messaging_cell::{GatewayError, MessagingGateway};
use shared_models::error::AppError;
use shared_utils::signature::SIGNATURE_HEADER;
use shared_utils::validation::clean_phone_number;

use crate::state::WebhookState;

#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub to: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Subscription handshake from the WhatsApp platform.
pub async fn verify_webhook(
    State(state): State<Arc<WebhookState>>,
    Query(params): Query<VerifyParams>,
) -> Result<String, AppError> {
    let expected = state.whatsapp.verify_token();

    let subscribed = params.mode.as_deref() == Some("subscribe")
        && !expected.is_empty()
        && params.verify_token.as_deref() == Some(expected);

    if !subscribed {
        warn!("Webhook verification failed for mode {:?}", params.mode);
        return Err(AppError::Forbidden("Webhook verification failed".to_string()));
    }

    info!("Webhook verified");
    Ok(params.challenge.unwrap_or_default())
}

/// Acknowledges straight away and handles the messages on a background task.
pub async fn receive_webhook(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    if !state.whatsapp.verify_signature(&body, signature) {
        warn!("Rejected webhook with bad or missing signature");
        return Err(AppError::Auth("Invalid webhook signature".to_string()));
    }

    let payload: WebhookPayload = serde_json::from_slice(&body).map_err(|e| {
        error!("Failed to parse webhook payload: {}", e);
        AppError::BadRequest("Invalid webhook data".to_string())
    })?;

    debug!("Webhook received for object {:?}", payload.object);

    let router = state.router.clone();
    tokio::spawn(async move {
        router.process_payload(&payload).await;
    });

    Ok(Json(json!({ "status": "received" })))
}

/// Operator endpoint for sending a one-off text message.
pub async fn send_message(
    State(state): State<Arc<WebhookState>>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<Value>, AppError> {
    if let Some(kind) = request.kind.as_deref().filter(|kind| *kind != "text") {
        return Err(AppError::BadRequest(format!(
            "Unsupported message type: {}",
            kind
        )));
    }

    let to = clean_phone_number(&request.to);
    if to.is_empty() {
        return Err(AppError::BadRequest("Recipient is required".to_string()));
    }

    state
        .whatsapp
        .send_text(&to, &request.message)
        .await
        .map_err(|e| {
            error!("Admin send to {} failed: {}", to, e);
            send_error(e)
        })?;

    Ok(Json(json!({ "status": "sent", "to": to })))
}

fn send_error(err: GatewayError) -> AppError {
    let message = format!("Failed to send message: {}", err);
    match err {
        GatewayError::InvalidMessage(_) => AppError::BadRequest(message),
        GatewayError::Transport(_) | GatewayError::Api { .. } => AppError::ExternalService(message),
        GatewayError::NotConfigured => AppError::Internal(message),
    }
}

pub async fn get_status(State(state): State<Arc<WebhookState>>) -> Json<Value> {
    let mut status = state.whatsapp.status().await;
    status.active_sessions = state.store.active_sessions().await;

    Json(json!(status))
}
