//! BizTime server entry point
//!
//! Owns the process-wide resources: logging, configuration and the store
//! handle. The store is opened here, injected into the repositories, and
//! closed here after the server stops.

use anyhow::Result;
use biztime::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match config.database_url.as_deref() {
        Some(url) => serve_postgres(&config, url).await,
        None => {
            tracing::info!("No DATABASE_URL configured, using the in-memory store");
            ServerBuilder::new()
                .with_in_memory_store(InMemoryStore::new())
                .serve(&config.bind_addr)
                .await
        }
    }
}

#[cfg(feature = "postgres")]
async fn serve_postgres(config: &AppConfig, url: &str) -> Result<()> {
    let gateway = PgGateway::connect(url, config.max_connections).await?;
    gateway.ensure_schema().await?;
    tracing::info!("Connected to PostgreSQL");

    let served = ServerBuilder::new()
        .with_postgres_gateway(gateway.clone())
        .serve(&config.bind_addr)
        .await;

    gateway.close().await;
    served
}

#[cfg(not(feature = "postgres"))]
async fn serve_postgres(_config: &AppConfig, _url: &str) -> Result<()> {
    anyhow::bail!("DATABASE_URL is set but biztime was built without the `postgres` feature")
}
