//! ServerBuilder for wiring repositories into an HTTP server

use super::handlers::AppState;
use super::router::build_router;
use crate::core::service::{CompanyRepository, IndustryRepository, InvoiceRepository};
use crate::storage::in_memory::{
    InMemoryCompanyRepository, InMemoryIndustryRepository, InMemoryInvoiceRepository,
    InMemoryStore,
};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for creating the HTTP server
///
/// All three repositories are required. The store behind them is created by
/// the caller, which also owns its shutdown.
///
/// # Example
///
/// ```ignore
/// let store = InMemoryStore::new();
/// ServerBuilder::new()
///     .with_in_memory_store(store)
///     .serve("127.0.0.1:3000")
///     .await?;
/// ```
#[derive(Default)]
pub struct ServerBuilder {
    companies: Option<Arc<dyn CompanyRepository>>,
    invoices: Option<Arc<dyn InvoiceRepository>>,
    industries: Option<Arc<dyn IndustryRepository>>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_company_repository(mut self, repo: impl CompanyRepository + 'static) -> Self {
        self.companies = Some(Arc::new(repo));
        self
    }

    pub fn with_invoice_repository(mut self, repo: impl InvoiceRepository + 'static) -> Self {
        self.invoices = Some(Arc::new(repo));
        self
    }

    pub fn with_industry_repository(mut self, repo: impl IndustryRepository + 'static) -> Self {
        self.industries = Some(Arc::new(repo));
        self
    }

    /// Use the in-memory backend for all three repositories
    pub fn with_in_memory_store(self, store: InMemoryStore) -> Self {
        self.with_company_repository(InMemoryCompanyRepository::new(store.clone()))
            .with_invoice_repository(InMemoryInvoiceRepository::new(store.clone()))
            .with_industry_repository(InMemoryIndustryRepository::new(store))
    }

    /// Use the PostgreSQL backend for all three repositories
    #[cfg(feature = "postgres")]
    pub fn with_postgres_gateway(self, gateway: crate::storage::postgres::PgGateway) -> Self {
        use crate::storage::postgres::{
            PostgresCompanyRepository, PostgresIndustryRepository, PostgresInvoiceRepository,
        };

        self.with_company_repository(PostgresCompanyRepository::new(gateway.clone()))
            .with_invoice_repository(PostgresInvoiceRepository::new(gateway.clone()))
            .with_industry_repository(PostgresIndustryRepository::new(gateway))
    }

    /// Build the shared handler state
    pub fn build_state(self) -> Result<AppState> {
        Ok(AppState {
            companies: self.companies.ok_or_else(|| {
                anyhow::anyhow!("CompanyRepository is required. Call .with_company_repository()")
            })?,
            invoices: self.invoices.ok_or_else(|| {
                anyhow::anyhow!("InvoiceRepository is required. Call .with_invoice_repository()")
            })?,
            industries: self.industries.ok_or_else(|| {
                anyhow::anyhow!("IndustryRepository is required. Call .with_industry_repository()")
            })?,
        })
    }

    /// Build the final REST router
    pub fn build(self) -> Result<Router> {
        Ok(build_router(self.build_state()?))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
