//! Query execution engine.
//!
//! Resolves an identity to its pool, borrows one connection, and streams the
//! result through a cursor into the projector.
//!
//! # Resource scope
//!
//! The connection and the cursor live only inside `execute`. The cursor is
//! closed before the connection is handed back, on success and on every error
//! path, so a failed call never leaves a connection checked out.

use crate::db::cursor::{DescribedColumn, DescribedMetadata, SqlxCursor};
use crate::db::projector::project;
use crate::db::registry::DataSourceRegistry;
use crate::db::statement::validate_read_only;
use crate::error::{DbError, DbResult};
use crate::impl_db_dispatch;
use crate::models::{QuerySpec, ResultDocument};
use sqlx::{Column, Executor, TypeInfo};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Runs read queries against registered datasources.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    registry: Arc<DataSourceRegistry>,
}

impl QueryExecutor {
    pub fn new(registry: Arc<DataSourceRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<DataSourceRegistry> {
        &self.registry
    }

    /// Execute `spec` against the datasource bound to `identity`.
    pub async fn execute(&self, identity: &str, spec: &QuerySpec) -> DbResult<ResultDocument> {
        let handle = self.registry.require(identity)?;
        let driver = handle.pool.driver();

        let sql = spec.sql()?;
        validate_read_only(&sql, driver)?;

        let catalog = handle.config.catalog();
        let start = Instant::now();
        debug!(identity, sql = %sql, fetch_size = ?spec.fetch_size, "Executing query");

        let document = impl_db_dispatch!(&handle.pool, pool => {
            let mut conn = pool.acquire().await.map_err(DbError::from_acquire)?;

            // Column metadata comes from describe so empty results still have columns
            let metadata = {
                let describe = (&mut *conn).describe(sql.as_str()).await?;
                let columns = describe
                    .columns()
                    .iter()
                    .enumerate()
                    .map(|(i, col)| {
                        DescribedColumn::new(
                            col.name(),
                            col.type_info().name(),
                            describe.nullable(i),
                            driver,
                        )
                    })
                    .collect();
                DescribedMetadata::new(columns, catalog)
            };

            // The statement runs even when no rows are wanted
            let mut cursor = SqlxCursor::new(metadata, (&mut *conn).fetch(sql.as_str()));
            let result = match cursor.start().await {
                Ok(()) => project(&mut cursor, spec.fetch_size).await,
                Err(e) => Err(e),
            };
            cursor.close();
            drop(conn);
            result?
        });

        debug!(
            identity,
            columns = document.columns.len(),
            rows = document.row_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Query completed"
        );
        Ok(document)
    }
}
