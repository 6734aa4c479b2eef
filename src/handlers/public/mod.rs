mod validate;

pub use validate::*;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::config::RateLimitConfig;
use crate::db::AppState;
use crate::rate_limit;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Unauthenticated endpoints used by deployed software.
pub fn router(rate_limit: RateLimitConfig) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/health", get(health))
        .layer(rate_limit::relaxed_layer(rate_limit.relaxed_rpm))
        .merge(
            Router::new()
                .route("/api/validate", post(validate_license))
                .layer(rate_limit::standard_layer(rate_limit.validate_rpm)),
        )
}
