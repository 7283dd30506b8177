use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::signature::tokens_match;

// Guards operator endpoints with the static admin bearer token
pub async fn admin_auth_middleware(
    State(config): State<Arc<AppConfig>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if !config.is_admin_enabled() {
        return Err(AppError::Forbidden("Admin endpoints are disabled".to_string()));
    }

    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    let token = auth_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

    if !tokens_match(&config.admin_api_token, token) {
        return Err(AppError::Auth("Invalid admin token".to_string()));
    }

    Ok(next.run(request).await)
}
