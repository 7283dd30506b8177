use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::admin_auth_middleware;

use crate::handlers;
use crate::state::WebhookState;

pub fn webhook_routes(state: Arc<WebhookState>) -> Router {
    // Platform callbacks authenticate with the verify token or the body signature
    let public_routes = Router::new().route(
        "/webhook",
        get(handlers::verify_webhook).post(handlers::receive_webhook),
    );

    let admin_routes = Router::new()
        .route("/admin/send", post(handlers::send_message))
        .route("/admin/status", get(handlers::get_status))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            admin_auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .with_state(state)
}
