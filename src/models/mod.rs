//! Data models for the datasource query server.
//!
//! This module re-exports all model types used throughout the application.

pub mod datasource;
pub mod query;

// Re-export commonly used types
pub use datasource::{
    DEFAULT_ACQUIRE_TIMEOUT_SECS, DEFAULT_IDENTITY, DEFAULT_MAX_POOL_SIZE, DriverKind, PoolConfig,
};
pub use query::{
    CURSOR_BATCH_SIZE, ColumnDescriptor, MAX_FETCH_SIZE, QuerySpec, ResultDocument, Row, Scale,
    SqlType,
};
