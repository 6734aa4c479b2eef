//! License Gate - license key issuance and hardware-bound validation
//!
//! This library provides the key store, the license lifecycle service,
//! and the HTTP handlers for the public validation endpoint and the admin API.

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod license;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod util;

use axum::Router;

use crate::config::RateLimitConfig;
use crate::db::AppState;

/// Full application router: public endpoints plus the admin API.
pub fn app(state: AppState, rate_limit: RateLimitConfig) -> Router {
    Router::new()
        .merge(handlers::public::router(rate_limit))
        .merge(handlers::admin::router(state.clone()))
        .with_state(state)
}
