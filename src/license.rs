//! License lifecycle: generation, validation with one-time hardware binding,
//! and administrative mutation.
//!
//! Validation order is fixed: unknown key, then revoked, then expired, then
//! hardware mismatch. Only the success path writes to the store.

use rusqlite::TransactionBehavior;

use crate::clock::Clock;
use crate::db::{DbPool, queries};
use crate::error::{AppError, OptionExt, Result, msg};
use crate::models::{KeyState, LicenseKey, LicenseKeyStats, ValidationOutcome, ValidationReason};
use crate::util::expiry_seconds;

/// Upper bound for a single bulk generation request.
pub const MAX_BULK_KEYS: usize = 100;

/// What validation should do for a key in a given state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Reject(ValidationReason),
    /// Accept the presented hardware id; `bind` is set when the key is still unbound.
    Accept { bind: bool },
}

/// Pure validation decision over the key state and the presented hardware id.
pub fn decide(state: &KeyState, hardware_id: &str) -> Verdict {
    match state {
        KeyState::Deleted => Verdict::Reject(ValidationReason::InvalidKey),
        KeyState::Revoked => Verdict::Reject(ValidationReason::Revoked),
        KeyState::Expired => Verdict::Reject(ValidationReason::Expired),
        KeyState::Bound(bound) if bound != hardware_id => {
            Verdict::Reject(ValidationReason::HardwareMismatch)
        }
        KeyState::Bound(_) => Verdict::Accept { bind: false },
        KeyState::Unbound => Verdict::Accept { bind: true },
    }
}

/// Stateless service over the key store. Cheap to construct per request.
#[derive(Clone)]
pub struct LicenseService {
    db: DbPool,
    clock: Clock,
}

impl LicenseService {
    pub fn new(db: DbPool, clock: Clock) -> Self {
        Self { db, clock }
    }

    /// Create one key. `expiry_days` absent or <= 0 creates a lifetime key.
    pub fn generate(&self, expiry_days: Option<i64>) -> Result<LicenseKey> {
        let conn = self.db.get()?;
        let key = queries::create_license_key(&conn, expiry_seconds(expiry_days), self.clock.now())?;
        tracing::info!(code = %key.code, expires_at = ?key.expires_at, "License key generated");
        Ok(key)
    }

    /// Create `count` keys atomically (1..=MAX_BULK_KEYS).
    pub fn generate_many(&self, count: usize, expiry_days: Option<i64>) -> Result<Vec<LicenseKey>> {
        if count == 0 || count > MAX_BULK_KEYS {
            return Err(AppError::BadRequest(msg::INVALID_BULK_COUNT.into()));
        }

        let mut conn = self.db.get()?;
        let keys = queries::create_license_keys(
            &mut conn,
            count,
            expiry_seconds(expiry_days),
            self.clock.now(),
        )?;
        tracing::info!(count = keys.len(), "License keys generated");
        Ok(keys)
    }

    /// Check a key presented by a client and bind it on first use.
    ///
    /// The read, the decision and the bind run in one IMMEDIATE transaction, so
    /// two concurrent first validations of the same key with different hardware
    /// ids are serialized: one binds, the other sees the binding and gets
    /// `HardwareMismatch`. Rejected attempts roll back without writing.
    pub fn validate(&self, code: &str, hardware_id: &str) -> Result<ValidationOutcome> {
        let mut conn = self.db.get()?;
        let now = self.clock.now();

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let key = queries::get_license_key(&tx, code)?;
        let state = KeyState::of(key.as_ref(), now);

        let bind = match decide(&state, hardware_id) {
            Verdict::Reject(reason) => {
                tracing::debug!(code, reason = reason.as_ref(), "License validation rejected");
                return Ok(ValidationOutcome::rejected(reason));
            }
            Verdict::Accept { bind } => bind,
        };

        if bind && !queries::bind_hardware(&tx, code, hardware_id)? {
            // Unreachable while the write lock is held; reject rather than trust it.
            tracing::warn!(code, "Hardware bind lost a race inside the transaction");
            return Ok(ValidationOutcome::rejected(ValidationReason::HardwareMismatch));
        }

        queries::touch_last_used(&tx, code, now)?;
        tx.commit()?;

        if bind {
            tracing::info!(code, hardware_id, "License key bound to hardware");
        }

        Ok(ValidationOutcome::accepted(key.and_then(|k| k.expires_at)))
    }

    pub fn get(&self, code: &str) -> Result<LicenseKey> {
        let conn = self.db.get()?;
        queries::get_license_key(&conn, code)?.or_not_found(msg::LICENSE_KEY_NOT_FOUND)
    }

    /// All keys, newest first.
    pub fn list(&self) -> Result<Vec<LicenseKey>> {
        let conn = self.db.get()?;
        queries::list_license_keys(&conn)
    }

    /// Hard-delete a key. Returns false if it did not exist.
    pub fn revoke(&self, code: &str) -> Result<bool> {
        let mut conn = self.db.get()?;
        let deleted = queries::delete_license_key(&mut conn, code, self.clock.now())?;
        if deleted {
            tracing::info!(code, "License key deleted");
        }
        Ok(deleted)
    }

    /// Soft-revoke (`active = false`) or reinstate a key without losing its history.
    pub fn set_active(&self, code: &str, active: bool) -> Result<LicenseKey> {
        let conn = self.db.get()?;
        if !queries::set_license_key_active(&conn, code, active)? {
            return Err(AppError::NotFound(msg::LICENSE_KEY_NOT_FOUND.into()));
        }
        tracing::info!(code, active, "License key active flag changed");

        queries::get_license_key(&conn, code)?.or_not_found(msg::LICENSE_KEY_NOT_FOUND)
    }

    pub fn stats(&self) -> Result<LicenseKeyStats> {
        let conn = self.db.get()?;
        queries::license_key_stats(&conn, self.clock.now())
    }
}
