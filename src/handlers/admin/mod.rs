mod keys;
mod stats;

pub use keys::*;
pub use stats::*;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::db::AppState;
use crate::middleware::admin_auth;

/// Admin API. Every route requires HTTP Basic admin credentials.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/admin/test", get(admin_check))
        .route("/api/admin/keys", get(list_keys))
        .route("/api/admin/keys/{code}", get(get_key))
        .route("/api/admin/keys/{code}", delete(delete_key))
        .route("/api/admin/keys/{code}/active", put(set_key_active))
        .route("/api/admin/generate", post(generate_key))
        .route("/api/admin/generate/bulk", post(generate_keys_bulk))
        .route("/api/admin/stats", get(get_stats))
        .layer(middleware::from_fn_with_state(state, admin_auth))
}
