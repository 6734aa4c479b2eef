use axum::extract::{Extension, State};
use serde::{Deserialize, Serialize};

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::{Json, Path};
use crate::middleware::AdminContext;
use crate::models::LicenseKey;

/// Unknown fields are rejected: a misspelled expiry must not mint a lifetime key.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GenerateRequest {
    /// Days until expiry. Absent, zero or negative = lifetime key.
    #[serde(default, alias = "expiry_days", alias = "durationDays", alias = "duration_days")]
    pub expiry_days: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BulkGenerateRequest {
    pub count: usize,
    #[serde(default, alias = "expiry_days", alias = "durationDays", alias = "duration_days")]
    pub expiry_days: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct KeyListResponse {
    pub keys: Vec<LicenseKey>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct AdminCheckResponse {
    pub ok: bool,
    pub username: String,
}

/// GET /api/admin/test
/// Lets the admin UI verify credentials before showing the dashboard.
pub async fn admin_check(Extension(ctx): Extension<AdminContext>) -> Json<AdminCheckResponse> {
    Json(AdminCheckResponse {
        ok: true,
        username: ctx.username,
    })
}

/// GET /api/admin/keys
pub async fn list_keys(State(state): State<AppState>) -> Result<Json<KeyListResponse>> {
    let keys = state.licenses().list()?;
    Ok(Json(KeyListResponse { keys }))
}

/// GET /api/admin/keys/{code}
pub async fn get_key(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<LicenseKey>> {
    Ok(Json(state.licenses().get(&code)?))
}

/// POST /api/admin/generate
pub async fn generate_key(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<LicenseKey>> {
    let key = state.licenses().generate(req.expiry_days)?;
    tracing::info!(admin = %ctx.username, code = %key.code, "Admin generated license key");
    Ok(Json(key))
}

/// POST /api/admin/generate/bulk
/// All keys are created in one transaction.
pub async fn generate_keys_bulk(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
    Json(req): Json<BulkGenerateRequest>,
) -> Result<Json<KeyListResponse>> {
    let keys = state.licenses().generate_many(req.count, req.expiry_days)?;
    tracing::info!(admin = %ctx.username, count = keys.len(), "Admin generated license keys");
    Ok(Json(KeyListResponse { keys }))
}

/// PUT /api/admin/keys/{code}/active
/// Soft revoke (`active: false`) or reinstate a key. Binding and history are kept.
pub async fn set_key_active(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
    Path(code): Path<String>,
    Json(req): Json<SetActiveRequest>,
) -> Result<Json<LicenseKey>> {
    let key = state.licenses().set_active(&code, req.active)?;
    tracing::info!(admin = %ctx.username, code = %code, active = req.active, "Admin changed license key state");
    Ok(Json(key))
}

/// DELETE /api/admin/keys/{code}
/// Deleting an unknown or already-deleted code is not an error: `{"deleted": false}`.
pub async fn delete_key(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
    Path(code): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let deleted = state.licenses().revoke(&code)?;
    if deleted {
        tracing::info!(admin = %ctx.username, code = %code, "Admin deleted license key");
    }
    Ok(Json(DeleteResponse { deleted }))
}
