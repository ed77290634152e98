//! Datasource Query Server Library
//!
//! Register SQL datasources (SQLite, PostgreSQL, MySQL) under a name and run
//! ad-hoc read queries against them, answered with portable column metadata
//! and a capped sample of rows.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod render;
pub mod transport;

pub use config::Config;
pub use db::{DataSourceRegistry, QueryExecutor};
pub use error::DbError;
