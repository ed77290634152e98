//! Datasource Query Server - Main entry point.
//!
//! Serves the query API over HTTP with the datasource given on the command
//! line registered as `default`.

use clap::Parser;
use datasource_query_server::config::Config;
use datasource_query_server::db::DataSourceRegistry;
use datasource_query_server::transport::{HttpTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    init_tracing(&config);

    // Validate the default datasource before binding anything
    let default_config = config.default_pool_config()?;

    info!(
        driver = %default_config.driver,
        url = %default_config.masked_url(),
        "Starting Datasource Query Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let registry = Arc::new(DataSourceRegistry::new());
    let transport = HttpTransport::new(
        registry,
        default_config,
        &config.http_host,
        config.http_port,
        config.shutdown_timeout(),
    );

    info!(transport = transport.name(), "Using HTTP transport");
    if let Err(e) = transport.run().await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
