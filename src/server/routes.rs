use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use super::handlers::{active_counts, events, health_check, list_clients, AppState};

pub fn create_router(state: Arc<AppState>) -> Router {
    // permissive CORS: the dashboard is served from another origin
    Router::new()
        .route("/clients", get(list_clients))
        .route("/clients/active", get(active_counts))
        .route("/events", get(events))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
