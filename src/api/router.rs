use axum::{middleware, routing::get, Router};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::health;
use super::middleware::logging_middleware;
use super::routes;
use super::state::AppState;
use super::types::Json;

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Hackathon Team Management API" }))
}

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/api", routes::create_api_router())
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
