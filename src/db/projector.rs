//! Projection of a cursor into a `ResultDocument`.

use crate::db::cursor::{Cursor, ResultMetadata};
use crate::db::types::normalize_class_name;
use crate::error::DbResult;
use crate::models::{ColumnDescriptor, MAX_FETCH_SIZE, ResultDocument, Row, Scale, SqlType};

/// Rows to read for a requested fetch size, or `None` when no data is wanted.
pub fn row_limit(fetch_size: Option<i64>) -> Option<usize> {
    match fetch_size {
        Some(n) if n > 0 => Some(n.min(MAX_FETCH_SIZE as i64) as usize),
        _ => None,
    }
}

/// Describe every column of the result, in result order.
pub fn describe_columns<M: ResultMetadata>(metadata: &M) -> Vec<ColumnDescriptor> {
    (1..=metadata.column_count())
        .map(|i| ColumnDescriptor {
            table: metadata
                .table_name(i)
                .filter(|t| !t.is_empty())
                .or_else(|| metadata.catalog_name(i))
                .map(String::from),
            name: metadata.column_name(i).to_string(),
            label: metadata.column_label(i).to_string(),
            size: metadata.display_size(i),
            nullable: metadata.is_nullable(i),
            auto_increment: metadata.is_auto_increment(i),
            sql_type: SqlType {
                code: metadata.type_code(i),
                name: metadata.type_name(i).to_string(),
            },
            class_name: normalize_class_name(metadata.class_name(i)),
            scale: Scale {
                scale: metadata.scale(i),
                precision: metadata.precision(i),
            },
        })
        .collect()
}

/// Build the result document from an open cursor.
///
/// At most `min(fetch_size, MAX_FETCH_SIZE)` rows are read; the cursor is
/// not advanced at all when no data was requested. Rows are keyed by column
/// name; when two columns share a name the later value wins.
pub async fn project<C: Cursor>(cursor: &mut C, fetch_size: Option<i64>) -> DbResult<ResultDocument> {
    let columns = describe_columns(cursor.metadata());

    let Some(limit) = row_limit(fetch_size) else {
        return Ok(ResultDocument {
            columns,
            data: None,
        });
    };

    let mut data = Vec::with_capacity(limit);
    while data.len() < limit {
        let Some(values) = cursor.next_row().await? else {
            break;
        };
        let row: Row = columns
            .iter()
            .map(|c| c.name.clone())
            .zip(values)
            .collect();
        data.push(row);
    }

    tracing::debug!(columns = columns.len(), rows = data.len(), "Projected result");
    Ok(ResultDocument {
        columns,
        data: Some(data),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::cursor::{DescribedColumn, DescribedMetadata};
    use crate::error::DbError;
    use crate::models::DriverKind;
    use serde_json::{Value as JsonValue, json};
    use std::collections::VecDeque;

    /// In-memory cursor that counts how many rows were pulled.
    struct FakeCursor {
        metadata: DescribedMetadata,
        rows: VecDeque<DbResult<Vec<JsonValue>>>,
        pulled: usize,
    }

    impl FakeCursor {
        fn new(columns: &[(&str, &str)], rows: Vec<Vec<JsonValue>>) -> Self {
            let columns = columns
                .iter()
                .map(|(name, ty)| DescribedColumn::new(*name, *ty, Some(false), DriverKind::SQLite))
                .collect();
            Self {
                metadata: DescribedMetadata::new(columns, Some("main".to_string())),
                rows: rows.into_iter().map(Ok).collect(),
                pulled: 0,
            }
        }
    }

    impl Cursor for FakeCursor {
        type Metadata = DescribedMetadata;

        fn metadata(&self) -> &DescribedMetadata {
            &self.metadata
        }

        async fn next_row(&mut self) -> DbResult<Option<Vec<JsonValue>>> {
            match self.rows.pop_front() {
                Some(row) => {
                    self.pulled += 1;
                    row.map(Some)
                }
                None => Ok(None),
            }
        }
    }

    fn numbered_rows(n: i64) -> Vec<Vec<JsonValue>> {
        (1..=n).map(|i| vec![json!(i), json!(format!("user{}", i))]).collect()
    }

    const USER_COLUMNS: &[(&str, &str)] = &[("id", "INTEGER"), ("name", "TEXT")];

    #[test]
    fn test_row_limit() {
        assert_eq!(row_limit(None), None);
        assert_eq!(row_limit(Some(0)), None);
        assert_eq!(row_limit(Some(-5)), None);
        assert_eq!(row_limit(Some(1)), Some(1));
        assert_eq!(row_limit(Some(100)), Some(100));
        assert_eq!(row_limit(Some(5000)), Some(100));
        assert_eq!(row_limit(Some(i64::MAX)), Some(100));
    }

    #[tokio::test]
    async fn test_rows_keyed_in_column_order() {
        let mut cursor = FakeCursor::new(USER_COLUMNS, numbered_rows(3));
        let doc = project(&mut cursor, Some(10)).await.unwrap();

        assert_eq!(doc.column_names(), vec!["id", "name"]);
        let data = doc.data.unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data[0].keys().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(JsonValue::Object(data[2].clone()), json!({"id": 3, "name": "user3"}));
    }

    #[tokio::test]
    async fn test_data_capped_at_maximum() {
        let mut cursor = FakeCursor::new(USER_COLUMNS, numbered_rows(150));
        let doc = project(&mut cursor, Some(1000)).await.unwrap();

        assert_eq!(doc.row_count(), 100);
        assert_eq!(cursor.pulled, 100);
    }

    #[tokio::test]
    async fn test_fetch_size_smaller_than_result() {
        let mut cursor = FakeCursor::new(USER_COLUMNS, numbered_rows(10));
        let doc = project(&mut cursor, Some(4)).await.unwrap();

        assert_eq!(doc.row_count(), 4);
        assert_eq!(cursor.pulled, 4);
    }

    #[tokio::test]
    async fn test_no_data_without_positive_fetch_size() {
        for fetch_size in [None, Some(0), Some(-1)] {
            let mut cursor = FakeCursor::new(USER_COLUMNS, numbered_rows(3));
            let doc = project(&mut cursor, fetch_size).await.unwrap();

            assert!(doc.data.is_none());
            assert_eq!(doc.columns.len(), 2);
            assert_eq!(cursor.pulled, 0);
            assert!(serde_json::to_value(&doc).unwrap().get("data").is_none());
        }
    }

    #[tokio::test]
    async fn test_empty_result_has_empty_data() {
        let mut cursor = FakeCursor::new(USER_COLUMNS, Vec::new());
        let doc = project(&mut cursor, Some(10)).await.unwrap();
        assert_eq!(doc.data, Some(Vec::new()));
        assert_eq!(doc.columns.len(), 2);
    }

    #[tokio::test]
    async fn test_table_falls_back_to_catalog() {
        let mut cursor = FakeCursor::new(USER_COLUMNS, Vec::new());
        let doc = project(&mut cursor, None).await.unwrap();

        let id = &doc.columns[0];
        assert_eq!(id.table.as_deref(), Some("main"));
        assert_eq!(id.label, "id");
        assert!(!id.nullable);
        assert!(!id.auto_increment);
        assert_eq!(id.class_name, "i64");
        assert_eq!(id.sql_type.name, "INTEGER");

        let name = &doc.columns[1];
        assert_eq!(name.class_name, "String");
        assert_eq!(name.scale.scale, None);
    }

    #[tokio::test]
    async fn test_duplicate_column_names_later_value_wins() {
        let mut cursor = FakeCursor::new(
            &[("v", "INTEGER"), ("v", "INTEGER")],
            vec![vec![json!(1), json!(2)]],
        );
        let doc = project(&mut cursor, Some(1)).await.unwrap();

        assert_eq!(doc.columns.len(), 2);
        let row = &doc.data.unwrap()[0];
        assert_eq!(row.len(), 1);
        assert_eq!(row["v"], json!(2));
    }

    #[tokio::test]
    async fn test_cursor_error_propagates() {
        let mut cursor = FakeCursor::new(USER_COLUMNS, numbered_rows(1));
        cursor
            .rows
            .push_back(Err(DbError::query_execution("boom", None)));
        let err = project(&mut cursor, Some(10)).await.unwrap_err();
        assert!(matches!(err, DbError::QueryExecution { .. }));
    }
}
