use axum::extract::State;

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::Json;
use crate::models::LicenseKeyStats;

/// GET /api/admin/stats
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<LicenseKeyStats>> {
    Ok(Json(state.licenses().stats()?))
}
