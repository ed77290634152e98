//! Data source models.
//!
//! This module defines the driver kinds the server understands and the
//! configuration a connection pool is built from.

use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Identity of the pool registered at startup.
pub const DEFAULT_IDENTITY: &str = "default";

/// Pool size used when a registration does not name one.
pub const DEFAULT_MAX_POOL_SIZE: u32 = 2;

/// Seconds to wait for a pooled connection before giving up.
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Supported database drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    PostgreSQL,
    /// Includes MariaDB
    MySQL,
    SQLite,
}

impl DriverKind {
    /// Resolve a driver identifier.
    ///
    /// Accepts short names (`postgres`, `mysql`, `sqlite`, ...) as well as the
    /// JDBC driver class names clients commonly send.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" | "org.postgresql.driver" => Some(Self::PostgreSQL),
            "mysql" | "mariadb" | "com.mysql.cj.jdbc.driver" | "com.mysql.jdbc.driver"
            | "org.mariadb.jdbc.driver" => Some(Self::MySQL),
            "sqlite" | "sqlite3" | "org.sqlite.jdbc" => Some(Self::SQLite),
            _ => None,
        }
    }

    /// Parse driver kind from a connection string.
    pub fn from_connection_string(connection_string: &str) -> Option<Self> {
        let lower = connection_string.to_lowercase();
        if lower.starts_with("postgres://") || lower.starts_with("postgresql://") {
            Some(Self::PostgreSQL)
        } else if lower.starts_with("mysql://") || lower.starts_with("mariadb://") {
            Some(Self::MySQL)
        } else if lower.starts_with("sqlite:") {
            Some(Self::SQLite)
        } else {
            None
        }
    }

    /// Get the display name for this driver.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PostgreSQL => "PostgreSQL",
            Self::MySQL => "MySQL",
            Self::SQLite => "SQLite",
        }
    }
}

impl std::fmt::Display for DriverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Configuration a connection pool is built from. Immutable once validated.
#[derive(Clone, Serialize)]
pub struct PoolConfig {
    pub driver: DriverKind,
    /// Connection URL with any `jdbc:` prefix removed.
    pub url: String,
    pub username: Option<String>,
    /// Never serialized or logged.
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub max_pool_size: u32,
    pub acquire_timeout: Duration,
}

impl PoolConfig {
    /// Validate raw registration fields into a pool configuration.
    ///
    /// Driver and URL are required; the URL scheme must agree with the driver.
    pub fn new(
        driver: Option<&str>,
        url: Option<&str>,
        username: Option<String>,
        password: Option<String>,
        max_pool_size: Option<u32>,
    ) -> DbResult<Self> {
        let driver_id = driver
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| DbError::configuration("driver is required"))?;
        let url = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| DbError::configuration("url is required"))?;

        let driver = DriverKind::from_identifier(driver_id).ok_or_else(|| {
            DbError::configuration(format!("unsupported driver '{}'", driver_id))
        })?;

        let url = url.strip_prefix("jdbc:").unwrap_or(url).to_string();
        Url::parse(&url).map_err(|e| DbError::configuration(format!("invalid url: {}", e)))?;

        match DriverKind::from_connection_string(&url) {
            Some(kind) if kind == driver => {}
            Some(kind) => {
                return Err(DbError::configuration(format!(
                    "url is a {} url but driver is {}",
                    kind, driver
                )));
            }
            None => {
                return Err(DbError::configuration(format!(
                    "url scheme is not supported by driver {}",
                    driver
                )));
            }
        }

        let max_pool_size = max_pool_size.unwrap_or(DEFAULT_MAX_POOL_SIZE);
        if max_pool_size == 0 {
            return Err(DbError::configuration(
                "maxPoolSize must be greater than 0",
            ));
        }

        Ok(Self {
            driver,
            url,
            username: username.filter(|u| !u.is_empty()),
            password,
            max_pool_size,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        })
    }

    /// Set the acquire timeout.
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Catalog reported for columns whose table the driver does not name.
    ///
    /// The database in the URL path for server databases, `main` for SQLite.
    pub fn catalog(&self) -> Option<String> {
        if self.driver == DriverKind::SQLite {
            return Some("main".to_string());
        }
        let url = Url::parse(&self.url).ok()?;
        url.path()
            .trim_start_matches('/')
            .split('/')
            .next()
            .filter(|s| !s.is_empty())
            .map(String::from)
    }

    /// Get a display-safe version of the URL (credentials masked).
    pub fn masked_url(&self) -> String {
        match Url::parse(&self.url) {
            Ok(mut url) if url.password().is_some() => {
                let _ = url.set_password(Some("****"));
                url.to_string()
            }
            _ => self.url.clone(),
        }
    }
}

impl std::fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolConfig")
            .field("driver", &self.driver)
            .field("url", &self.masked_url())
            .field("username", &self.username)
            .field("max_pool_size", &self.max_pool_size)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish_non_exhaustive()
    }
}
