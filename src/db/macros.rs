//! Driver dispatch macro.
//!
//! Generates the match over `DbPool` variants when every arm runs the same
//! expression against the driver-specific pool.

/// Run the same expression against whichever driver pool is held.
///
/// # Example
///
/// ```ignore
/// let size = impl_db_dispatch!(pool, p => p.size());
/// ```
#[macro_export]
macro_rules! impl_db_dispatch {
    ($pool:expr, $p:ident => $body:expr) => {
        match $pool {
            $crate::db::pool::DbPool::MySql($p) => $body,
            $crate::db::pool::DbPool::Postgres($p) => $body,
            $crate::db::pool::DbPool::SQLite($p) => $body,
        }
    };
}
