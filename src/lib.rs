//! # BizTime
//!
//! A REST API over companies, their invoices and the industries they belong
//! to, backed by a relational store.
//!
//! ## Layers
//!
//! - **Storage**: [`storage::in_memory`] (default) or [`storage::postgres`]
//!   (feature `postgres`), each implementing the repository traits over an
//!   injected store handle
//! - **Repositories**: [`core::service`] traits, one per entity
//! - **Errors**: [`core::error::BizError`], rendered to HTTP in exactly one place
//! - **Handlers**: [`server::handlers`], wired by [`server::ServerBuilder`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use biztime::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     ServerBuilder::new()
//!         .with_in_memory_store(InMemoryStore::new())
//!         .serve("127.0.0.1:3000")
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        BizError, BizResult, Company, CompanyChanges, CompanyDetail, CompanyRepository,
        EntityError, Industry, IndustryRepository, Invoice, InvoiceChanges, InvoiceDetail,
        InvoiceRepository, InvoiceSummary, NewCompany, NewIndustry, NewInvoice, RequestError,
        StorageError, ValidationError, slugify,
    };

    // === Storage ===
    pub use crate::storage::{
        InMemoryCompanyRepository, InMemoryIndustryRepository, InMemoryInvoiceRepository,
        InMemoryStore,
    };
    #[cfg(feature = "postgres")]
    pub use crate::storage::{
        PgGateway, PostgresCompanyRepository, PostgresIndustryRepository,
        PostgresInvoiceRepository,
    };

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder, build_router};
}
