//! Configuration handling for the datasource query server.
//!
//! This module provides configuration management via CLI arguments and environment variables.

use crate::error::DbResult;
use crate::models::{DEFAULT_ACQUIRE_TIMEOUT_SECS, PoolConfig};
use clap::Parser;
use std::time::Duration;

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 7000;
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Server configuration.
///
/// `--driver` and `--url` describe the datasource registered under the
/// `default` identity at startup.
#[derive(Debug, Clone, Parser)]
#[command(name = "datasource-query-server")]
#[command(version, about = "Run read queries against named SQL datasources over HTTP")]
pub struct Config {
    /// HTTP host to bind to
    #[arg(long, default_value = DEFAULT_HTTP_HOST, env = "DSQ_HTTP_HOST")]
    pub http_host: String,

    /// HTTP port to bind to
    #[arg(long, default_value_t = DEFAULT_HTTP_PORT, env = "DSQ_HTTP_PORT")]
    pub http_port: u16,

    /// Driver of the default datasource (postgres, mysql, sqlite)
    #[arg(long, env = "DSQ_DRIVER")]
    pub driver: String,

    /// Connection URL of the default datasource
    #[arg(long, env = "DSQ_URL")]
    pub url: String,

    /// Username of the default datasource
    #[arg(long, env = "DSQ_USERNAME")]
    pub username: Option<String>,

    /// Password of the default datasource
    #[arg(long, env = "DSQ_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Maximum pool size of the default datasource (default: 2)
    #[arg(long, env = "DSQ_MAX_POOL_SIZE")]
    pub max_pool_size: Option<u32>,

    /// Seconds to wait for a pooled connection
    #[arg(
        long,
        default_value_t = DEFAULT_ACQUIRE_TIMEOUT_SECS,
        env = "DSQ_ACQUIRE_TIMEOUT"
    )]
    pub acquire_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "DSQ_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "DSQ_JSON_LOGS")]
    pub json_logs: bool,

    /// Seconds in-flight requests get to finish after a shutdown signal
    #[arg(
        long,
        default_value_t = DEFAULT_SHUTDOWN_TIMEOUT_SECS,
        env = "DSQ_SHUTDOWN_TIMEOUT"
    )]
    pub shutdown_timeout: u64,
}

impl Config {
    /// Pool configuration of the `default` datasource.
    pub fn default_pool_config(&self) -> DbResult<PoolConfig> {
        Ok(PoolConfig::new(
            Some(&self.driver),
            Some(&self.url),
            self.username.clone(),
            self.password.clone(),
            self.max_pool_size,
        )?
        .with_acquire_timeout(Duration::from_secs(self.acquire_timeout)))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }
}
