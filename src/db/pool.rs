//! Connection pool construction.
//!
//! This module builds driver-specific pools (MySqlPool, PgPool, SqlitePool) from a
//! validated `PoolConfig`, so each driver keeps its full type support.

use crate::error::{DbError, DbResult};
use crate::impl_db_dispatch;
use crate::models::{DriverKind, PoolConfig};
use sqlx::{
    MySqlPool, PgPool, SqlitePool, mysql::MySqlConnectOptions, mysql::MySqlPoolOptions,
    postgres::PgConnectOptions, postgres::PgPoolOptions, sqlite::SqliteConnectOptions,
    sqlite::SqlitePoolOptions,
};
use std::str::FromStr;

/// Driver-specific connection pool (avoids AnyPool limitations).
#[derive(Debug, Clone)]
pub enum DbPool {
    MySql(MySqlPool),
    Postgres(PgPool),
    SQLite(SqlitePool),
}

impl DbPool {
    /// Build a pool for the given configuration.
    ///
    /// The pool is lazy: no connection is opened until the first borrow, so
    /// unreachable servers surface as acquisition errors at query time.
    pub fn connect_lazy(config: &PoolConfig) -> DbResult<Self> {
        let pool = match config.driver {
            DriverKind::MySQL => {
                let mut options = MySqlConnectOptions::from_str(&config.url)
                    .map_err(|e| invalid_url(config.driver, e))?
                    .charset("utf8mb4");
                if let Some(username) = &config.username {
                    options = options.username(username);
                }
                if let Some(password) = &config.password {
                    options = options.password(password);
                }

                let pool = MySqlPoolOptions::new()
                    .max_connections(config.max_pool_size)
                    .acquire_timeout(config.acquire_timeout)
                    .connect_lazy_with(options);
                DbPool::MySql(pool)
            }
            DriverKind::PostgreSQL => {
                let mut options = PgConnectOptions::from_str(&config.url)
                    .map_err(|e| invalid_url(config.driver, e))?
                    .options([("default_transaction_read_only", "on")]);
                if let Some(username) = &config.username {
                    options = options.username(username);
                }
                if let Some(password) = &config.password {
                    options = options.password(password);
                }

                let pool = PgPoolOptions::new()
                    .max_connections(config.max_pool_size)
                    .acquire_timeout(config.acquire_timeout)
                    .connect_lazy_with(options);
                DbPool::Postgres(pool)
            }
            DriverKind::SQLite => {
                // SQLite has no credentials; username/password are ignored.
                let options = SqliteConnectOptions::from_str(&config.url)
                    .map_err(|e| invalid_url(config.driver, e))?
                    .read_only(true);

                let pool = SqlitePoolOptions::new()
                    .max_connections(config.max_pool_size)
                    .acquire_timeout(config.acquire_timeout)
                    .connect_lazy_with(options);
                DbPool::SQLite(pool)
            }
        };
        Ok(pool)
    }

    /// Close the connection pool, waiting for borrowed connections to return.
    pub async fn close(&self) {
        impl_db_dispatch!(self, pool => pool.close().await)
    }

    /// Get the driver for this pool.
    pub fn driver(&self) -> DriverKind {
        match self {
            DbPool::MySql(_) => DriverKind::MySQL,
            DbPool::Postgres(_) => DriverKind::PostgreSQL,
            DbPool::SQLite(_) => DriverKind::SQLite,
        }
    }

    /// Number of connections currently borrowed from the pool.
    pub fn active_connections(&self) -> usize {
        impl_db_dispatch!(self, pool => (pool.size() as usize).saturating_sub(pool.num_idle()))
    }

    /// Whether `close` has been called on the pool.
    pub fn is_closed(&self) -> bool {
        impl_db_dispatch!(self, pool => pool.is_closed())
    }
}

fn invalid_url(driver: DriverKind, err: sqlx::Error) -> DbError {
    DbError::configuration(format!("Invalid {} connection url: {}", driver, err))
}
