// src/api/handlers/system_handler.rs
use axum::{response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

/// ヘルスチェック
pub async fn health_check_handler() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "consent-backend",
    }))
}

pub fn system_router() -> Router {
    Router::new().route("/health", get(health_check_handler))
}
