//! Error types for the datasource query server.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! The core never formats or recovers from these errors; the HTTP layer maps every
//! variant to a uniform `{status, message}` document.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid data source configuration: {message}")]
    Configuration { message: String },

    #[error("Unknown data source: '{identity}'")]
    UnknownDataSource { identity: String },

    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    #[error("Failed to acquire connection: {message}")]
    ConnectionAcquisition { message: String, suggestion: String },

    #[error("Query failed: {message}")]
    QueryExecution {
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
    },

    #[error("Unknown template: '{template}'")]
    UnknownTemplate { template: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an unknown data source error.
    pub fn unknown_data_source(identity: impl Into<String>) -> Self {
        Self::UnknownDataSource {
            identity: identity.into(),
        }
    }

    /// Create an invalid query error.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Create a connection acquisition error with a helpful suggestion.
    pub fn connection_acquisition(
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::ConnectionAcquisition {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a query execution error with optional SQL state.
    pub fn query_execution(message: impl Into<String>, sql_state: Option<String>) -> Self {
        Self::QueryExecution {
            message: message.into(),
            sql_state,
        }
    }

    /// Create an unknown template error.
    pub fn unknown_template(template: impl Into<String>) -> Self {
        Self::UnknownTemplate {
            template: template.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Name of the error kind, as used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "ConfigurationError",
            Self::UnknownDataSource { .. } => "UnknownDataSourceError",
            Self::InvalidQuery { .. } => "InvalidQueryError",
            Self::ConnectionAcquisition { .. } => "ConnectionAcquisitionError",
            Self::QueryExecution { .. } => "QueryExecutionError",
            Self::UnknownTemplate { .. } => "UnknownTemplateError",
            Self::Internal { .. } => "InternalError",
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::ConnectionAcquisition { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// Map an error raised while borrowing a connection from a pool.
    pub fn from_acquire(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::configuration(msg.to_string()),
            sqlx::Error::PoolTimedOut => DbError::connection_acquisition(
                "Timed out waiting for a pooled connection",
                "The pool is exhausted; retry later or raise maxPoolSize",
            ),
            sqlx::Error::PoolClosed => DbError::connection_acquisition(
                "Connection pool is closed",
                "Register the data source again",
            ),
            sqlx::Error::Io(io_err) => DbError::connection_acquisition(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => DbError::connection_acquisition(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Database(db_err) => DbError::connection_acquisition(
                db_err.message().to_string(),
                "Verify the credentials and that the database exists",
            ),
            other => DbError::connection_acquisition(
                other.to_string(),
                "Check the connection URL and database server status",
            ),
        }
    }
}

/// Errors raised while a statement runs or its rows are read.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DbError::query_execution(db_err.message(), code)
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DbError::from_acquire(err)
            }
            sqlx::Error::ColumnDecode { index, source } => DbError::query_execution(
                format!("Failed to decode column {}: {}", index, source),
                None,
            ),
            other => DbError::query_execution(other.to_string(), None),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;
