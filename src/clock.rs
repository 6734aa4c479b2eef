//! Source of "now" for expiry and timestamps.
//!
//! Production code uses [`Clock::system`]; tests swap in a fixed or manually
//! advanced clock so expiry can be exercised without sleeping.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

#[derive(Clone)]
pub struct Clock(Arc<dyn Fn() -> i64 + Send + Sync>);

impl Clock {
    /// Wall clock, Unix seconds.
    pub fn system() -> Self {
        Self(Arc::new(|| Utc::now().timestamp()))
    }

    pub fn fixed(timestamp: i64) -> Self {
        Self(Arc::new(move || timestamp))
    }

    /// A clock that reads from a shared cell the caller can advance.
    pub fn manual(cell: Arc<AtomicI64>) -> Self {
        Self(Arc::new(move || cell.load(Ordering::SeqCst)))
    }

    pub fn now(&self) -> i64 {
        (self.0)()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Clock").field(&self.now()).finish()
    }
}
