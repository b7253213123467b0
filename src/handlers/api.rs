use axum::{
    Json,
    http::header,
    response::{Html, IntoResponse},
};
use serde::Serialize;

/// Client page, embedded at build time
const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Client script, embedded at build time
const APP_JS: &str = include_str!("../../static/js/app.js");

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Liveness probe. Performs no dependency checks.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// Serve the recording page
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Serve the recording page's script
pub async fn app_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        APP_JS,
    )
}
