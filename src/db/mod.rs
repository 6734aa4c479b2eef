mod from_row;
mod schema;
pub mod queries;

pub use schema::{SCHEMA_VERSION, init_db};

use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::clock::Clock;
use crate::config::AdminCredentials;
use crate::license::LicenseService;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// License key store
    pub db: DbPool,
    /// Source of "now" for expiry checks and timestamps
    pub clock: Clock,
    /// Admin API credentials (None = admin API disabled)
    pub admin: Option<AdminCredentials>,
}

impl AppState {
    pub fn licenses(&self) -> LicenseService {
        LicenseService::new(self.db.clone(), self.clock.clone())
    }
}

/// Per-connection setup: bounded lock wait, WAL, and fully synchronous commits
/// so a successful bind is on disk before the response goes out.
fn configure_connection(conn: &mut Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout)?;
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
    conn.pragma_update(None, "synchronous", "FULL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(())
}

pub fn create_pool(database_path: &str, timeout: Duration) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path)
        .with_init(move |conn| configure_connection(conn, timeout));
    Pool::builder()
        .max_size(10)
        .connection_timeout(timeout)
        .build(manager)
}

/// Single-connection in-memory pool. Each SQLite in-memory connection is its
/// own database, so the pool must never open a second one.
pub fn create_memory_pool(timeout: Duration) -> Result<DbPool, r2d2::Error> {
    let manager =
        SqliteConnectionManager::memory().with_init(move |conn| configure_connection(conn, timeout));
    Pool::builder()
        .max_size(1)
        .connection_timeout(timeout)
        .build(manager)
}
