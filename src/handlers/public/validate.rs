use axum::{extract::State, http::HeaderMap};
use serde::Deserialize;

use crate::db::AppState;
use crate::error::{AppError, Result, msg};
use crate::extractors::Json;
use crate::models::ValidationOutcome;
use crate::util::extract_request_info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    /// License code (older clients send `key`)
    #[serde(default, alias = "key")]
    pub code: Option<String>,
    /// Opaque machine identifier (older clients send `hwid` or `hardware_id`)
    #[serde(default, alias = "hardware_id", alias = "hwid")]
    pub hardware_id: Option<String>,
}

fn required(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// POST /api/validate
///
/// Every decision (valid or not) is a 200 with a reason code. Only a missing
/// field (400) or a storage fault (5xx) produces an error status.
pub async fn validate_license(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ValidateRequest>,
) -> Result<Json<ValidationOutcome>> {
    let (Some(code), Some(hardware_id)) = (
        required(req.code.as_deref()),
        required(req.hardware_id.as_deref()),
    ) else {
        return Err(AppError::BadRequest(msg::MISSING_CODE_OR_HWID.into()));
    };

    let outcome = state.licenses().validate(code, hardware_id)?;

    if outcome.valid {
        let (ip, user_agent) = extract_request_info(&headers);
        tracing::debug!(code, client_ip = ?ip, user_agent = ?user_agent, "License validated");
    }

    Ok(Json(outcome))
}
