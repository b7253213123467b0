use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::api;
use crate::state::AppState;
use std::sync::Arc;

/// Create the router for the page, its script and the health check
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(api::index))
        .route("/static/js/app.js", get(api::app_script))
        .route("/api/health", get(api::health_check))
        .layer(TraceLayer::new_for_http())
}
