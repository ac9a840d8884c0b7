//! Repository traits for the three entities
//!
//! Handlers only see these traits. Each storage backend implements all three
//! over a shared store handle that is created by the process entry point and
//! injected at construction time.

use crate::core::error::BizResult;
use crate::core::model::{
    Company, CompanyChanges, CompanyDetail, Industry, Invoice, InvoiceChanges, InvoiceDetail,
    InvoiceSummary, NewCompany, NewIndustry, NewInvoice,
};
use async_trait::async_trait;

/// Persistence operations for companies
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// List every company
    async fn list_all(&self) -> BizResult<Vec<Company>>;

    /// Get a company and the ids of its invoices, in ascending order
    ///
    /// Fails with `NotFound` when no company has this code.
    async fn get_by_code(&self, code: &str) -> BizResult<CompanyDetail>;

    /// Create a company, deriving its code from the name
    ///
    /// Fails with `Conflict` when the derived code (or the name) is taken.
    async fn create(&self, company: NewCompany) -> BizResult<Company>;

    /// Update name and description of the company with this code
    async fn update(&self, code: &str, changes: CompanyChanges) -> BizResult<Company>;

    /// Delete the company with this code
    ///
    /// Invoices and industries of the company are deleted with it.
    async fn delete(&self, code: &str) -> BizResult<()>;
}

/// Persistence operations for invoices
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// List `(id, comp_code)` for every invoice
    async fn list_all(&self) -> BizResult<Vec<InvoiceSummary>>;

    /// Get an invoice joined with its company
    async fn get_by_id(&self, id: i32) -> BizResult<InvoiceDetail>;

    /// Create an unpaid invoice for an existing company
    ///
    /// Fails with `ReferentialViolation` when `comp_code` names no company.
    async fn create(&self, invoice: NewInvoice) -> BizResult<Invoice>;

    /// Update amount and paid status, applying the paid-date transition
    async fn update(&self, id: i32, changes: InvoiceChanges) -> BizResult<Invoice>;

    async fn delete(&self, id: i32) -> BizResult<()>;
}

/// Persistence operations for industries
#[async_trait]
pub trait IndustryRepository: Send + Sync {
    async fn list_all(&self) -> BizResult<Vec<Industry>>;

    /// Fails with `ReferentialViolation` for an unknown company and
    /// `Conflict` for a duplicate code.
    async fn create(&self, industry: NewIndustry) -> BizResult<Industry>;
}
