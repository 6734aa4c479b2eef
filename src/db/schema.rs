use rusqlite::Connection;

/// Stamped into `PRAGMA user_version` after the schema is created.
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the license key schema. Safe to run on every startup.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- License keys (one row per issued key, keyed by its code)
        -- active: 0 = administratively revoked, 1 = usable
        -- hardware_id: NULL until first successful validation, then never changes
        CREATE TABLE IF NOT EXISTS license_keys (
            code TEXT PRIMARY KEY NOT NULL,
            hardware_id TEXT,
            created_at INTEGER NOT NULL,
            expires_at INTEGER,
            active INTEGER NOT NULL DEFAULT 1 CHECK (active IN (0, 1)),
            last_used_at INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_license_keys_created ON license_keys(created_at DESC);
        CREATE INDEX IF NOT EXISTS idx_license_keys_hardware ON license_keys(hardware_id) WHERE hardware_id IS NOT NULL;

        -- Codes of hard-deleted keys. Never reissued.
        CREATE TABLE IF NOT EXISTS retired_license_codes (
            code TEXT PRIMARY KEY NOT NULL,
            retired_at INTEGER NOT NULL
        );
        "#,
    )?;

    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}
