//! Datasource registration handler.

use crate::db::DataSourceRegistry;
use crate::error::DbResult;
use crate::models::PoolConfig;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Input for registering a datasource.
///
/// The legacy field names `name`, `driverClassName` and `jdbcUrl` are accepted
/// as aliases.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    /// Identity the datasource is registered under
    #[serde(default, alias = "name")]
    pub identity: Option<String>,
    /// Driver identifier: `postgres`, `mysql`, `sqlite`, or a JDBC driver class
    #[serde(default, alias = "driverClassName")]
    pub driver: Option<String>,
    /// Connection URL, optionally prefixed with `jdbc:`
    #[serde(default, alias = "jdbcUrl")]
    pub url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub max_pool_size: Option<u32>,
    #[serde(default)]
    pub acquire_timeout_secs: Option<u64>,
}

impl RegisterInput {
    /// Validate the input into an identity and pool configuration.
    pub fn into_config(self) -> DbResult<(String, PoolConfig)> {
        let identity = self.identity.unwrap_or_default();
        let mut config = PoolConfig::new(
            self.driver.as_deref(),
            self.url.as_deref(),
            self.username,
            self.password,
            self.max_pool_size,
        )?;
        if let Some(secs) = self.acquire_timeout_secs {
            config = config.with_acquire_timeout(Duration::from_secs(secs));
        }
        Ok((identity, config))
    }
}

/// Handler for datasource registration and listing.
pub struct DataSourceHandler {
    registry: Arc<DataSourceRegistry>,
}

impl DataSourceHandler {
    pub fn new(registry: Arc<DataSourceRegistry>) -> Self {
        Self { registry }
    }

    /// Register (or replace) a datasource.
    pub fn register(&self, input: RegisterInput) -> DbResult<()> {
        let (identity, config) = input.into_config()?;
        self.registry.register(&identity, config)?;
        info!(identity = %identity, total = self.registry.len(), "Datasource available");
        Ok(())
    }

    /// Registered identities, sorted.
    pub fn list(&self) -> Vec<String> {
        self.registry.identities()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;

    #[test]
    fn test_legacy_field_names() {
        let input: RegisterInput = serde_json::from_value(serde_json::json!({
            "name": "legacy",
            "driverClassName": "org.sqlite.JDBC",
            "jdbcUrl": "jdbc:sqlite::memory:",
            "maxPoolSize": 3
        }))
        .unwrap();

        let (identity, config) = input.into_config().unwrap();
        assert_eq!(identity, "legacy");
        assert_eq!(config.url, "sqlite::memory:");
        assert_eq!(config.max_pool_size, 3);
    }

    #[test]
    fn test_acquire_timeout_applied() {
        let input = RegisterInput {
            identity: Some("a".into()),
            driver: Some("sqlite".into()),
            url: Some("sqlite::memory:".into()),
            acquire_timeout_secs: Some(5),
            ..Default::default()
        };
        let (_, config) = input.into_config().unwrap();
        assert_eq!(config.acquire_timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_register_missing_url() {
        let handler = DataSourceHandler::new(Arc::new(DataSourceRegistry::new()));
        let err = handler
            .register(RegisterInput {
                identity: Some("a".into()),
                driver: Some("sqlite".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, DbError::Configuration { .. }));
        assert!(handler.list().is_empty());
    }

    #[tokio::test]
    async fn test_register_then_list() {
        let handler = DataSourceHandler::new(Arc::new(DataSourceRegistry::new()));
        for identity in ["b", "a"] {
            handler
                .register(RegisterInput {
                    identity: Some(identity.into()),
                    driver: Some("sqlite".into()),
                    url: Some("sqlite::memory:".into()),
                    ..Default::default()
                })
                .unwrap();
        }
        assert_eq!(handler.list(), vec!["a", "b"]);
    }
}
