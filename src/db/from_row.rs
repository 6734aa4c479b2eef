//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::LicenseKey;

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub const LICENSE_KEY_COLS: &str =
    "code, hardware_id, created_at, expires_at, active, last_used_at";

impl FromRow for LicenseKey {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(LicenseKey {
            code: row.get(0)?,
            hardware_id: row.get(1)?,
            created_at: row.get(2)?,
            expires_at: row.get(3)?,
            active: row.get(4)?,
            last_used_at: row.get(5)?,
        })
    }
}
