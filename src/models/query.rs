//! Query-related data models.
//!
//! This module defines the query request shape and the portable result document.

use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Hard ceiling on rows returned per query, regardless of the requested fetch size.
pub const MAX_FETCH_SIZE: u32 = 100;

/// Number of driver-delivered rows the cursor drains per batch.
pub const CURSOR_BATCH_SIZE: usize = 200;

/// One row of a result document, keyed by column name in column order.
pub type Row = serde_json::Map<String, JsonValue>;

/// A read request: either a raw statement or a bare table name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySpec {
    #[serde(default)]
    pub statement: Option<String>,
    /// Accepted for compatibility, not used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub fetch_size: Option<i64>,
}

impl QuerySpec {
    /// Create a request for a raw statement.
    pub fn statement(sql: impl Into<String>) -> Self {
        Self {
            statement: Some(sql.into()),
            ..Self::default()
        }
    }

    /// Create a request for every row of a table.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            ..Self::default()
        }
    }

    /// Set the fetch size.
    pub fn with_fetch_size(mut self, fetch_size: i64) -> Self {
        self.fetch_size = Some(fetch_size);
        self
    }

    /// Resolve the SQL text to run.
    ///
    /// The statement wins when both shapes are present. The table name is
    /// interpolated as-is; callers are trusted with identifiers.
    pub fn sql(&self) -> DbResult<String> {
        // Blank text counts as absent; non-blank text is used verbatim
        let non_blank = |s: &Option<String>| {
            s.as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(String::from)
        };

        if let Some(statement) = non_blank(&self.statement) {
            return Ok(statement);
        }
        if let Some(table) = non_blank(&self.table) {
            return Ok(format!("SELECT * FROM {}", table));
        }
        Err(DbError::invalid_query(
            "either 'statement' or 'table' is required",
        ))
    }
}

/// The `(typeCode, typeName)` pair of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlType {
    /// Portable SQL type code (`java.sql.Types` numbering).
    #[serde(rename = "type")]
    pub code: i32,
    /// Type name as reported by the driver.
    pub name: String,
}

/// The `(scale, precision)` pair of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    pub scale: Option<i32>,
    pub precision: Option<i32>,
}

/// Metadata of one result column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    /// Owning table, or the catalog when the driver names no table.
    pub table: Option<String>,
    pub name: String,
    pub label: String,
    pub size: Option<i32>,
    pub nullable: bool,
    pub auto_increment: bool,
    pub sql_type: SqlType,
    pub class_name: String,
    pub scale: Scale,
}

/// Portable answer to a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultDocument {
    pub columns: Vec<ColumnDescriptor>,
    /// Present only when a positive fetch size was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Row>>,
}

impl ResultDocument {
    /// Number of rows carried, zero when no data was requested.
    pub fn row_count(&self) -> usize {
        self.data.as_ref().map_or(0, Vec::len)
    }

    /// Column names in result order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}
