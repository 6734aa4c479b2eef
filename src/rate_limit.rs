//! Per-IP rate limiting for public endpoints.
//!
//! Tiers:
//! - Standard: /api/validate (database write on every accepted call)
//! - Relaxed: /health
//!
//! Configure via environment variables:
//! - RATE_LIMIT_VALIDATE_RPM (default: 30)
//! - RATE_LIMIT_RELAXED_RPM (default: 60)

use std::sync::Arc;
use std::time::Duration;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;

/// Rate limiter layer type alias using governor types directly
pub type RateLimitLayer = GovernorLayer<
    tower_governor::key_extractor::PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    axum::body::Body,
>;

/// Creates a rate limiter layer with the specified requests per minute.
/// A zero limit is treated as one request per minute.
fn create_layer(requests_per_minute: u32) -> RateLimitLayer {
    let requests_per_minute = requests_per_minute.max(1);

    let period_secs = 60 / requests_per_minute as u64;
    let config = GovernorConfigBuilder::default()
        .period(Duration::from_secs(period_secs.max(1)))
        .burst_size(requests_per_minute)
        .finish()
        .expect("period and burst size are both non-zero");

    GovernorLayer::new(Arc::new(config))
}

/// Creates a rate limiter layer for license validation.
pub fn standard_layer(requests_per_minute: u32) -> RateLimitLayer {
    create_layer(requests_per_minute)
}

/// Creates a rate limiter layer for lightweight endpoints like health checks.
pub fn relaxed_layer(requests_per_minute: u32) -> RateLimitLayer {
    create_layer(requests_per_minute)
}
