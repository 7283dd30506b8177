use std::sync::Arc;

use axum::{response::Json, routing::get, Router};
use chrono::Utc;
use serde_json::{json, Value};

use booking_cell::{webhook_routes, WebhookState};

pub fn create_router(state: Arc<WebhookState>) -> Router {
    let whatsapp_configured = state.config.is_whatsapp_configured();
    let health = move || async move { health_check(whatsapp_configured) };

    Router::new()
        .route("/", get(health.clone()))
        .route("/health", get(health))
        .nest("/api/whatsapp", webhook_routes(state))
}

fn health_check(whatsapp_configured: bool) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "whatsapp_configured": whatsapp_configured,
    }))
}
