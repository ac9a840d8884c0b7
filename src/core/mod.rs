//! Core module containing the error model, entity types and repository traits

pub mod error;
pub mod model;
pub mod service;
pub mod slug;

pub use error::{BizError, BizResult, EntityError, RequestError, StorageError, ValidationError};
pub use model::{
    Company, CompanyChanges, CompanyDetail, Industry, Invoice, InvoiceChanges, InvoiceDetail,
    InvoiceSummary, NewCompany, NewIndustry, NewInvoice,
};
pub use service::{CompanyRepository, IndustryRepository, InvoiceRepository};
pub use slug::{company_code, slugify};
