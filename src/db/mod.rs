//! Database abstraction layer.
//!
//! This module provides database access functionality:
//! - Connection pool construction
//! - The identity → pool registry
//! - Read-only statement validation
//! - Cursor and result projection
//! - Type mappings

pub mod cursor;
pub mod executor;
pub mod macros;
pub mod pool;
pub mod projector;
pub mod registry;
pub mod statement;
pub mod types;

pub use cursor::{Cursor, ResultMetadata};
pub use executor::QueryExecutor;
pub use pool::DbPool;
pub use registry::{DataSourceRegistry, PoolHandle};
pub use statement::validate_read_only;
