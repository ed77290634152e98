//! Read-only statement guard.
//!
//! Every query passes through `validate_read_only` before it reaches a pooled
//! connection. The text must hold exactly one statement and that statement must
//! only read (SELECT, SHOW, DESCRIBE, EXPLAIN of a query).
//!
//! Text sqlparser cannot parse is rejected: a statement that cannot be
//! classified is never sent to a connection.

use crate::error::{DbError, DbResult};
use crate::models::DriverKind;
use sqlparser::ast::Statement;
use sqlparser::dialect::{Dialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;

fn dialect_for(driver: DriverKind) -> Box<dyn Dialect> {
    match driver {
        DriverKind::PostgreSQL => Box::new(PostgreSqlDialect {}),
        DriverKind::MySQL => Box::new(MySqlDialect {}),
        DriverKind::SQLite => Box::new(SQLiteDialect {}),
    }
}

/// Check that `sql` is a single read-only statement for the given driver.
pub fn validate_read_only(sql: &str, driver: DriverKind) -> DbResult<()> {
    let statements = Parser::parse_sql(dialect_for(driver).as_ref(), sql).map_err(|e| {
        DbError::invalid_query(format!("statement could not be parsed: {}", e))
    })?;

    match statements.as_slice() {
        [] => Err(DbError::invalid_query("statement is empty")),
        [stmt] if is_read_only(stmt) => Ok(()),
        [_] => Err(DbError::invalid_query(format!(
            "{} statements are not allowed; only read-only queries are accepted",
            leading_keyword(sql)
        ))),
        _ => Err(DbError::invalid_query(
            "only a single statement is allowed per query",
        )),
    }
}

fn is_read_only(stmt: &Statement) -> bool {
    match stmt {
        Statement::Query(_)
        | Statement::ShowTables { .. }
        | Statement::ShowColumns { .. }
        | Statement::ShowDatabases { .. }
        | Statement::ShowSchemas { .. }
        | Statement::ShowCreate { .. }
        | Statement::ShowFunctions { .. }
        | Statement::ShowVariable { .. }
        | Statement::ShowVariables { .. }
        | Statement::ShowStatus { .. }
        | Statement::ShowCollation { .. }
        | Statement::ExplainTable { .. } => true,
        // EXPLAIN ANALYZE runs its statement, so the inner one decides
        Statement::Explain { statement, .. } => is_read_only(statement),
        _ => false,
    }
}

fn leading_keyword(sql: &str) -> String {
    sql.split_whitespace()
        .next()
        .map(|w| w.trim_end_matches(';').to_ascii_uppercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PG: DriverKind = DriverKind::PostgreSQL;

    #[test]
    fn test_select_allowed() {
        assert!(validate_read_only("SELECT * FROM users", PG).is_ok());
        assert!(validate_read_only("SELECT 1 AS one", DriverKind::SQLite).is_ok());
    }

    #[test]
    fn test_complex_select_allowed() {
        let sql = r#"
            SELECT u.name, (SELECT COUNT(*) FROM orders WHERE user_id = u.id) AS order_count
            FROM users u
            WHERE u.id IN (SELECT user_id FROM active_users)
        "#;
        assert!(validate_read_only(sql, PG).is_ok());
        assert!(validate_read_only("SELECT a FROM t1 UNION ALL SELECT b FROM t2", PG).is_ok());
        assert!(validate_read_only("WITH x AS (SELECT 1) SELECT * FROM x", PG).is_ok());
    }

    #[test]
    fn test_show_and_explain_allowed() {
        assert!(validate_read_only("SHOW TABLES", DriverKind::MySQL).is_ok());
        assert!(validate_read_only("EXPLAIN SELECT * FROM users", PG).is_ok());
    }

    #[test]
    fn test_trailing_semicolon_allowed() {
        assert!(validate_read_only("SELECT 1;", PG).is_ok());
    }

    #[test]
    fn test_writes_rejected() {
        for sql in [
            "INSERT INTO users VALUES (1)",
            "UPDATE users SET name = 'test'",
            "DELETE FROM users",
            "CREATE TABLE test (id INT)",
            "DROP TABLE users",
            "INSERT INTO archive SELECT * FROM users",
        ] {
            let err = validate_read_only(sql, PG).unwrap_err();
            assert!(matches!(err, DbError::InvalidQuery { .. }), "{}", sql);
        }
    }

    #[test]
    fn test_rejection_names_keyword() {
        let err = validate_read_only("delete from users", PG).unwrap_err();
        assert!(err.to_string().contains("DELETE"), "{}", err);
    }

    #[test]
    fn test_explain_of_write_rejected() {
        assert!(validate_read_only("EXPLAIN ANALYZE DELETE FROM users", PG).is_err());
    }

    #[test]
    fn test_multiple_statements_rejected() {
        let err = validate_read_only("SELECT 1; SELECT 2", PG).unwrap_err();
        assert!(err.to_string().contains("single statement"));
        assert!(validate_read_only("SELECT 1; DROP TABLE users", PG).is_err());
    }

    #[test]
    fn test_unparseable_rejected() {
        let err = validate_read_only("SELEKT nonsense", PG).unwrap_err();
        assert!(err.to_string().contains("could not be parsed"), "{}", err);
    }

    #[test]
    fn test_sqlite_maintenance_statements_rejected() {
        for sql in [
            "DELETE FROM users INDEXED BY idx WHERE id = 2",
            "VACUUM INTO '/tmp/copy.db'",
            "ANALYZE",
            "REINDEX",
        ] {
            let err = validate_read_only(sql, DriverKind::SQLite).unwrap_err();
            assert!(matches!(err, DbError::InvalidQuery { .. }), "{}", sql);
        }
    }

    #[test]
    fn test_transaction_control_rejected() {
        assert!(validate_read_only("COMMIT", PG).is_err());
        assert!(validate_read_only("BEGIN", PG).is_err());
    }
}
