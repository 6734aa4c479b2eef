use rusqlite::{Connection, ErrorCode, TransactionBehavior, params};

use crate::error::{AppError, Result};
use crate::models::*;

use super::from_row::{LICENSE_KEY_COLS, query_all, query_one};

/// Alphabet for license codes: 36 symbols, so a 16 character code carries ~82 bits.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_GROUPS: usize = 4;
const CODE_GROUP_LEN: usize = 4;

/// Fresh candidates tried before giving up on a unique insert.
pub const MAX_CODE_ATTEMPTS: usize = 5;

// ============ License Keys ============

/// Generate a license code candidate: XXXX-XXXX-XXXX-XXXX.
///
/// Uniqueness is not assumed; `create_license_key` retries on collision.
pub fn generate_license_code() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();

    let mut part = || -> String {
        (0..CODE_GROUP_LEN)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    };

    (0..CODE_GROUPS)
        .map(|_| part())
        .collect::<Vec<_>>()
        .join("-")
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

/// Try to insert one candidate code. Returns false if the code is taken, either
/// by a live key or by a key that was deleted earlier.
fn try_insert_license_key(
    conn: &Connection,
    code: &str,
    created_at: i64,
    expires_at: Option<i64>,
) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT INTO license_keys (code, hardware_id, created_at, expires_at, active, last_used_at)
         SELECT ?1, NULL, ?2, ?3, 1, NULL
         WHERE NOT EXISTS (SELECT 1 FROM retired_license_codes WHERE code = ?1)",
        params![code, created_at, expires_at],
    );

    match inserted {
        Ok(affected) => Ok(affected > 0),
        Err(e) if is_constraint_violation(&e) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Create a new, unbound, active license key.
///
/// `expires_in` is the lifetime in seconds; None or a non-positive value makes a
/// lifetime key. Codes are generated until one inserts cleanly, up to
/// `MAX_CODE_ATTEMPTS`.
pub fn create_license_key(conn: &Connection, expires_in: Option<i64>, now: i64) -> Result<LicenseKey> {
    let expires_at = expires_in
        .filter(|secs| *secs > 0)
        .map(|secs| now.saturating_add(secs));

    for attempt in 1..=MAX_CODE_ATTEMPTS {
        let code = generate_license_code();
        if try_insert_license_key(conn, &code, now, expires_at)? {
            return Ok(LicenseKey {
                code,
                hardware_id: None,
                created_at: now,
                expires_at,
                active: true,
                last_used_at: None,
            });
        }
        tracing::warn!("License code collision (attempt {}/{})", attempt, MAX_CODE_ATTEMPTS);
    }

    Err(AppError::Internal(format!(
        "Could not generate a unique license code after {} attempts",
        MAX_CODE_ATTEMPTS
    )))
}

/// Create several keys in one transaction: either all are stored or none.
pub fn create_license_keys(
    conn: &mut Connection,
    count: usize,
    expires_in: Option<i64>,
    now: i64,
) -> Result<Vec<LicenseKey>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let keys = (0..count)
        .map(|_| create_license_key(&tx, expires_in, now))
        .collect::<Result<Vec<_>>>()?;

    tx.commit()?;
    Ok(keys)
}

pub fn get_license_key(conn: &Connection, code: &str) -> Result<Option<LicenseKey>> {
    query_one(
        conn,
        &format!("SELECT {} FROM license_keys WHERE code = ?1", LICENSE_KEY_COLS),
        &[&code],
    )
}

/// All keys, newest first. Keys created in the same second keep insertion order reversed.
pub fn list_license_keys(conn: &Connection) -> Result<Vec<LicenseKey>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM license_keys ORDER BY created_at DESC, rowid DESC",
            LICENSE_KEY_COLS
        ),
        &[],
    )
}

/// Bind a key to a hardware id if it is not bound yet (compare-and-set).
///
/// Returns true if the key is now bound to `hardware_id`, including when it
/// already was. Returns false if the key is bound to a different id or does
/// not exist. Never overwrites an existing binding.
pub fn bind_hardware(conn: &Connection, code: &str, hardware_id: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE license_keys SET hardware_id = ?2 WHERE code = ?1 AND hardware_id IS NULL",
        params![code, hardware_id],
    )?;

    if affected > 0 {
        return Ok(true);
    }

    let current = get_license_key(conn, code)?;
    Ok(current.and_then(|k| k.hardware_id).as_deref() == Some(hardware_id))
}

pub fn touch_last_used(conn: &Connection, code: &str, now: i64) -> Result<()> {
    conn.execute(
        "UPDATE license_keys SET last_used_at = ?2 WHERE code = ?1",
        params![code, now],
    )?;
    Ok(())
}

/// Flip the administrative active flag. Returns false if the code does not exist.
pub fn set_license_key_active(conn: &Connection, code: &str, active: bool) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE license_keys SET active = ?2 WHERE code = ?1",
        params![code, active],
    )?;
    Ok(affected > 0)
}

/// Hard-delete a key. The code is retired so it can never be issued again.
/// Returns false if no key had this code.
pub fn delete_license_key(conn: &mut Connection, code: &str, now: i64) -> Result<bool> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let deleted = tx.execute("DELETE FROM license_keys WHERE code = ?1", params![code])?;
    if deleted > 0 {
        tx.execute(
            "INSERT OR IGNORE INTO retired_license_codes (code, retired_at) VALUES (?1, ?2)",
            params![code, now],
        )?;
    }

    tx.commit()?;
    Ok(deleted > 0)
}

pub fn license_key_stats(conn: &Connection, now: i64) -> Result<LicenseKeyStats> {
    conn.query_row(
        "SELECT
            COUNT(*),
            COALESCE(SUM(CASE WHEN active = 1 AND (expires_at IS NULL OR expires_at >= ?1) THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN expires_at IS NOT NULL AND expires_at < ?1 THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN hardware_id IS NOT NULL THEN 1 ELSE 0 END), 0)
         FROM license_keys",
        params![now],
        |row| {
            Ok(LicenseKeyStats {
                total: row.get(0)?,
                active: row.get(1)?,
                expired: row.get(2)?,
                bound: row.get(3)?,
            })
        },
    )
    .map_err(Into::into)
}
