//! Cursor capability over a relational result.
//!
//! The projector only depends on these two traits: `ResultMetadata` describes the
//! columns (1-indexed, in result order) and `Cursor` yields rows one at a time.
//! `SqlxCursor` adapts a sqlx row stream borrowed from a pooled connection.

use crate::db::types::{DecodeRow, type_profile};
use crate::error::DbResult;
use crate::models::{CURSOR_BATCH_SIZE, DriverKind};
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::future::Future;

/// Column metadata of a result, addressed by 1-based column index.
pub trait ResultMetadata {
    fn column_count(&self) -> usize;
    fn table_name(&self, column: usize) -> Option<&str>;
    fn catalog_name(&self, column: usize) -> Option<&str>;
    fn column_name(&self, column: usize) -> &str;
    fn column_label(&self, column: usize) -> &str;
    fn display_size(&self, column: usize) -> Option<i32>;
    fn is_nullable(&self, column: usize) -> bool;
    fn is_auto_increment(&self, column: usize) -> bool;
    fn type_code(&self, column: usize) -> i32;
    fn type_name(&self, column: usize) -> &str;
    /// Fully qualified name of the type values of this column decode into.
    fn class_name(&self, column: usize) -> &str;
    fn scale(&self, column: usize) -> Option<i32>;
    fn precision(&self, column: usize) -> Option<i32>;
}

/// A forward-only, read-only cursor.
pub trait Cursor: Send {
    type Metadata: ResultMetadata;

    fn metadata(&self) -> &Self::Metadata;

    /// Advance to the next row, returning its values in column order.
    fn next_row(&mut self) -> impl Future<Output = DbResult<Option<Vec<JsonValue>>>> + Send;
}

/// One column as described by the driver before execution.
#[derive(Debug, Clone)]
pub struct DescribedColumn {
    pub name: String,
    pub type_name: String,
    /// `None` when the driver cannot tell.
    pub nullable: Option<bool>,
    pub type_code: i32,
    pub class_name: &'static str,
    pub display_size: Option<i32>,
    pub precision: Option<i32>,
    pub scale: Option<i32>,
}

impl DescribedColumn {
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        nullable: Option<bool>,
        driver: DriverKind,
    ) -> Self {
        let type_name = type_name.into();
        let profile = type_profile(&type_name, driver);
        Self {
            name: name.into(),
            type_code: profile.type_code,
            class_name: profile.class_name,
            display_size: profile.display_size,
            precision: profile.precision,
            scale: profile.scale,
            type_name,
            nullable,
        }
    }
}

/// Metadata assembled from a driver `describe` of the statement.
#[derive(Debug, Clone)]
pub struct DescribedMetadata {
    columns: Vec<DescribedColumn>,
    catalog: Option<String>,
}

impl DescribedMetadata {
    pub fn new(columns: Vec<DescribedColumn>, catalog: Option<String>) -> Self {
        Self { columns, catalog }
    }

    fn column(&self, column: usize) -> &DescribedColumn {
        &self.columns[column - 1]
    }
}

impl ResultMetadata for DescribedMetadata {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    // sqlx does not report the originating table of a result column.
    fn table_name(&self, _column: usize) -> Option<&str> {
        None
    }

    fn catalog_name(&self, _column: usize) -> Option<&str> {
        self.catalog.as_deref()
    }

    fn column_name(&self, column: usize) -> &str {
        &self.column(column).name
    }

    fn column_label(&self, column: usize) -> &str {
        &self.column(column).name
    }

    fn display_size(&self, column: usize) -> Option<i32> {
        self.column(column).display_size
    }

    fn is_nullable(&self, column: usize) -> bool {
        self.column(column).nullable.unwrap_or(true)
    }

    fn is_auto_increment(&self, _column: usize) -> bool {
        false
    }

    fn type_code(&self, column: usize) -> i32 {
        self.column(column).type_code
    }

    fn type_name(&self, column: usize) -> &str {
        &self.column(column).type_name
    }

    fn class_name(&self, column: usize) -> &str {
        self.column(column).class_name
    }

    fn scale(&self, column: usize) -> Option<i32> {
        self.column(column).scale
    }

    fn precision(&self, column: usize) -> Option<i32> {
        self.column(column).precision
    }
}

/// Cursor over a sqlx row stream.
///
/// Rows the driver has already delivered are drained in batches of up to
/// `CURSOR_BATCH_SIZE`; the stream is never polled past what the caller reads
/// plus one batch.
pub struct SqlxCursor<'c, R> {
    metadata: DescribedMetadata,
    stream: futures_util::stream::ReadyChunks<BoxStream<'c, Result<R, sqlx::Error>>>,
    buffered: VecDeque<Result<R, sqlx::Error>>,
    exhausted: bool,
}

impl<'c, R> SqlxCursor<'c, R>
where
    R: DecodeRow + Send + 'c,
{
    pub fn new(metadata: DescribedMetadata, stream: BoxStream<'c, Result<R, sqlx::Error>>) -> Self {
        Self {
            metadata,
            stream: stream.ready_chunks(CURSOR_BATCH_SIZE),
            buffered: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Run the statement and buffer its first batch of rows.
    ///
    /// Errors the driver raises on the first row surface here, even when the
    /// caller never reads a row.
    pub async fn start(&mut self) -> DbResult<()> {
        self.fill().await;
        if matches!(self.buffered.front(), Some(Err(_))) {
            if let Some(Err(e)) = self.buffered.pop_front() {
                return Err(e.into());
            }
        }
        Ok(())
    }

    async fn fill(&mut self) {
        if self.buffered.is_empty() && !self.exhausted {
            match self.stream.next().await {
                Some(batch) => self.buffered.extend(batch),
                None => self.exhausted = true,
            }
        }
    }

    /// Close the cursor, discarding any unread rows.
    pub fn close(self) {
        drop(self);
    }
}

impl<'c, R> Cursor for SqlxCursor<'c, R>
where
    R: DecodeRow + Send + 'c,
{
    type Metadata = DescribedMetadata;

    fn metadata(&self) -> &DescribedMetadata {
        &self.metadata
    }

    async fn next_row(&mut self) -> DbResult<Option<Vec<JsonValue>>> {
        self.fill().await;

        match self.buffered.pop_front() {
            Some(row) => Ok(Some(row?.decode_values())),
            None => Ok(None),
        }
    }
}
