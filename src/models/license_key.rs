use serde::{Deserialize, Serialize};

/// A license key as stored in the `license_keys` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseKey {
    /// XXXX-XXXX-XXXX-XXXX, immutable once created
    pub code: String,
    /// Hardware identity the key is bound to. Set once, on first successful validation.
    pub hardware_id: Option<String>,
    pub created_at: i64,
    /// None = lifetime key
    pub expires_at: Option<i64>,
    /// Administrative flag; false makes the key unusable without deleting it
    pub active: bool,
    pub last_used_at: Option<i64>,
}

impl LicenseKey {
    pub fn is_expired_at(&self, now: i64) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at < now)
    }

    pub fn is_bound(&self) -> bool {
        self.hardware_id.is_some()
    }
}

/// Lifecycle state of a key, derived from its stored fields at read time.
///
/// Precedence follows the validation order: a revoked key reports `Revoked`
/// even when it has also expired, and an expired key reports `Expired`
/// regardless of binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyState {
    Unbound,
    Bound(String),
    Expired,
    Revoked,
    /// No row for the code (never created, or hard-deleted)
    Deleted,
}

impl KeyState {
    pub fn of(key: Option<&LicenseKey>, now: i64) -> Self {
        let Some(key) = key else {
            return KeyState::Deleted;
        };

        if !key.active {
            return KeyState::Revoked;
        }

        if key.is_expired_at(now) {
            return KeyState::Expired;
        }

        match &key.hardware_id {
            Some(hardware_id) => KeyState::Bound(hardware_id.clone()),
            None => KeyState::Unbound,
        }
    }
}

/// Counts over all keys, computed against the current time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseKeyStats {
    pub total: i64,
    /// Active flag set and not expired
    pub active: i64,
    /// Has an expiry in the past (regardless of the active flag)
    pub expired: i64,
    pub bound: i64,
}
