//! HTTP transport for the datasource query server.
//!
//! Routes:
//! - `POST /api/datasource`: register a datasource
//! - `GET /api/datasource`: list registered identities
//! - `POST /api/table`: run a read query (identity in the `x-db-identity` header)
//! - `POST /api/template`: run a read query and render it through a template
//!
//! Every error is answered with `{status, message}` and the same HTTP status.

use crate::db::{DataSourceRegistry, QueryExecutor};
use crate::error::{DbError, DbResult};
use crate::handlers::{DataSourceHandler, QueryHandler, RegisterInput, TemplateInput};
use crate::models::{PoolConfig, QuerySpec, ResultDocument};
use crate::transport::Transport;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{debug, error, info, warn};

/// Header carrying the datasource identity of a query.
pub const IDENTITY_HEADER: &str = "x-db-identity";

#[derive(Clone)]
struct AppState {
    datasources: Arc<DataSourceHandler>,
    queries: Arc<QueryHandler>,
}

/// Build the API router over a registry.
pub fn router(registry: Arc<DataSourceRegistry>) -> Router {
    let state = AppState {
        datasources: Arc::new(DataSourceHandler::new(registry.clone())),
        queries: Arc::new(QueryHandler::new(QueryExecutor::new(registry))),
    };

    Router::new()
        .route(
            "/api/datasource",
            post(register_datasource).get(list_datasources),
        )
        .route("/api/table", post(query_table))
        .route("/api/template", post(render_template))
        .with_state(state)
}

/// Error response: `{status, message}` with a matching HTTP status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// HTTP status for each error kind.
pub fn status_for(err: &DbError) -> StatusCode {
    match err {
        DbError::Configuration { .. }
        | DbError::InvalidQuery { .. }
        | DbError::UnknownTemplate { .. } => StatusCode::BAD_REQUEST,
        DbError::UnknownDataSource { .. } => StatusCode::NOT_FOUND,
        DbError::ConnectionAcquisition { .. } => StatusCode::SERVICE_UNAVAILABLE,
        DbError::QueryExecution { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DbError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        let status = status_for(&err);
        if status.is_server_error() {
            warn!(kind = err.kind(), error = %err, "Request failed");
        } else {
            debug!(kind = err.kind(), error = %err, "Request rejected");
        }
        let message = match err.suggestion() {
            Some(suggestion) => format!("{} ({})", err, suggestion),
            None => err.to_string(),
        };
        Self { status, message }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "status": self.status.as_u16(),
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

fn identity(headers: &HeaderMap) -> DbResult<&str> {
    headers
        .get(IDENTITY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DbError::unknown_data_source(""))
}

async fn register_datasource(
    State(state): State<AppState>,
    payload: Result<Json<RegisterInput>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(input) = payload?;
    state.datasources.register(input)?;
    Ok(StatusCode::OK)
}

async fn list_datasources(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.datasources.list())
}

async fn query_table(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<QuerySpec>, JsonRejection>,
) -> Result<Json<ResultDocument>, ApiError> {
    let identity = identity(&headers)?;
    let Json(spec) = payload?;
    Ok(Json(state.queries.query(identity, &spec).await?))
}

async fn render_template(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<TemplateInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let identity = identity(&headers)?;
    let Json(input) = payload?;
    let output = state.queries.render(identity, &input).await?;
    Ok(([(header::CONTENT_TYPE, output.content_type)], output.body).into_response())
}

/// HTTP transport: binds, bootstraps the default datasource, then serves.
pub struct HttpTransport {
    registry: Arc<DataSourceRegistry>,
    default_config: PoolConfig,
    host: String,
    port: u16,
    shutdown_timeout: Duration,
}

impl HttpTransport {
    pub fn new(
        registry: Arc<DataSourceRegistry>,
        default_config: PoolConfig,
        host: impl Into<String>,
        port: u16,
        shutdown_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            default_config,
            host: host.into(),
            port,
            shutdown_timeout,
        }
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Transport for HttpTransport {
    async fn run(&self) -> DbResult<()> {
        let bind_addr = self.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            DbError::internal(format!("Failed to bind to {}: {}", bind_addr, e))
        })?;
        info!("Listening on {}", bind_addr);

        self.registry.bootstrap_default(self.default_config.clone())?;

        let app = router(self.registry.clone());

        let shutdown_notify = Arc::new(tokio::sync::Notify::new());
        let shutdown_notify_clone = shutdown_notify.clone();
        let shutdown_signal = async move {
            wait_for_signal().await;
            shutdown_notify_clone.notify_one();
        };

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal);

        // In-flight queries get `shutdown_timeout` to finish; a second signal forces exit
        tokio::select! {
            result = server => {
                match result {
                    Ok(()) => info!("HTTP server stopped"),
                    Err(e) => {
                        error!(error = %e, "HTTP server error");
                        return Err(DbError::internal(format!("HTTP server error: {}", e)));
                    }
                }
            }
            _ = async {
                shutdown_notify.notified().await;
                info!(
                    timeout_secs = self.shutdown_timeout.as_secs(),
                    "Waiting for in-flight requests (send signal again to force exit)..."
                );

                tokio::select! {
                    _ = tokio::time::sleep(self.shutdown_timeout) => {
                        warn!("Graceful shutdown timeout, forcing exit");
                    }
                    _ = wait_for_signal() => {
                        warn!("Received second signal, forcing immediate exit");
                    }
                }
            } => {}
        }

        info!("Closing datasource pools");
        self.registry.close_all().await;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn wait_for_signal() {
    let ctrl_c = signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_config() -> PoolConfig {
        PoolConfig::new(Some("sqlite"), Some("sqlite::memory:"), None, None, None).unwrap()
    }

    #[test]
    fn test_bind_addr() {
        let transport = HttpTransport::new(
            Arc::new(DataSourceRegistry::new()),
            sqlite_config(),
            "0.0.0.0",
            7000,
            Duration::from_secs(30),
        );
        assert_eq!(transport.bind_addr(), "0.0.0.0:7000");
        assert_eq!(transport.name(), "http");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&DbError::configuration("x")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&DbError::invalid_query("x")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&DbError::unknown_template("x")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&DbError::unknown_data_source("ghost")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&DbError::connection_acquisition("x", "y")),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&DbError::query_execution("x", None)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&DbError::internal("x")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_identity_header() {
        let err = identity(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, DbError::UnknownDataSource { .. }));

        let mut headers = HeaderMap::new();
        headers.insert(IDENTITY_HEADER, "reports".parse().unwrap());
        assert_eq!(identity(&headers).unwrap(), "reports");
    }

    #[test]
    fn test_api_error_message_includes_suggestion() {
        let err = ApiError::from(DbError::connection_acquisition("timed out", "retry later"));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.message().contains("retry later"));
    }
}
