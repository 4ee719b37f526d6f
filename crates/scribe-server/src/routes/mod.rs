//! HTTP routes and router assembly.

pub mod process;

use axum::extract::{DefaultBodyLimit, State};
use axum::{routing::get, Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check(State(_state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let upload_limit = state.config().limits.max_upload_mb as usize * 1024 * 1024;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .merge(process::router())
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
