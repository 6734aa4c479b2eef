use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// Why a validation succeeded or failed. Rejections are ordinary responses,
/// not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValidationReason {
    InvalidKey,
    Revoked,
    Expired,
    HardwareMismatch,
    Success,
}

impl ValidationReason {
    pub fn message(self) -> &'static str {
        match self {
            ValidationReason::InvalidKey => "Invalid license key",
            ValidationReason::Revoked => "License key has been revoked",
            ValidationReason::Expired => "License key expired",
            ValidationReason::HardwareMismatch => "License key already bound to another machine",
            ValidationReason::Success => "License valid",
        }
    }
}

/// Result of a validation attempt, returned to the client as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub valid: bool,
    pub reason: ValidationReason,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl ValidationOutcome {
    pub fn rejected(reason: ValidationReason) -> Self {
        Self {
            valid: false,
            reason,
            message: reason.message().to_string(),
            expires_at: None,
        }
    }

    pub fn accepted(expires_at: Option<i64>) -> Self {
        Self {
            valid: true,
            reason: ValidationReason::Success,
            message: ValidationReason::Success.message().to_string(),
            expires_at,
        }
    }
}
