//! In-memory relational store for testing and development
//!
//! Keeps the three tables behind one `RwLock` and enforces the same
//! constraints as the PostgreSQL schema: unique company codes and names,
//! unique industry codes, foreign keys from invoices and industries to
//! companies, and cascading deletes when a company goes away. Companies and
//! industries list by code, invoices by id.

use crate::core::error::{BizError, BizResult, EntityError};
use crate::core::model::{
    Company, CompanyChanges, CompanyDetail, Industry, Invoice, InvoiceChanges, InvoiceDetail,
    InvoiceSummary, NewCompany, NewIndustry, NewInvoice,
};
use crate::core::service::{CompanyRepository, IndustryRepository, InvoiceRepository};
use crate::core::slug::company_code;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tables {
    companies: BTreeMap<String, Company>,
    invoices: BTreeMap<i32, Invoice>,
    industries: BTreeMap<String, Industry>,
    last_invoice_id: i32,
}

impl Tables {
    fn require_company(&self, entity_type: &'static str, comp_code: &str) -> BizResult<&Company> {
        self.companies.get(comp_code).ok_or_else(|| {
            EntityError::ReferentialViolation {
                entity_type,
                referenced: "Company",
                key: comp_code.to_string(),
            }
            .into()
        })
    }

    fn name_taken(&self, name: &str, except_code: Option<&str>) -> bool {
        self.companies
            .values()
            .any(|c| c.name == name && Some(c.code.as_str()) != except_code)
    }
}

/// Shared handle to the in-memory tables
///
/// Cloning is cheap; all clones see the same data.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> BizResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|e| BizError::Internal(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> BizResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|e| BizError::Internal(format!("Failed to acquire write lock: {}", e)))
    }
}

// ---------------------------------------------------------------------------
// Companies
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct InMemoryCompanyRepository {
    store: InMemoryStore,
}

impl InMemoryCompanyRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CompanyRepository for InMemoryCompanyRepository {
    async fn list_all(&self) -> BizResult<Vec<Company>> {
        Ok(self.store.read()?.companies.values().cloned().collect())
    }

    async fn get_by_code(&self, code: &str) -> BizResult<CompanyDetail> {
        let tables = self.store.read()?;
        let company = tables
            .companies
            .get(code)
            .cloned()
            .ok_or_else(|| BizError::not_found("Company", code))?;

        let invoices = tables
            .invoices
            .values()
            .filter(|inv| inv.comp_code == code)
            .map(|inv| inv.id)
            .collect();

        Ok(CompanyDetail::new(company, invoices))
    }

    async fn create(&self, company: NewCompany) -> BizResult<Company> {
        let code = company_code(&company.name)?;
        let mut tables = self.store.write()?;

        if tables.companies.contains_key(&code) {
            return Err(EntityError::Conflict {
                entity_type: "Company",
                key: code,
            }
            .into());
        }
        if tables.name_taken(&company.name, None) {
            return Err(EntityError::Conflict {
                entity_type: "Company",
                key: company.name,
            }
            .into());
        }

        let row = Company {
            code: code.clone(),
            name: company.name,
            description: company.description,
        };
        tables.companies.insert(code, row.clone());
        Ok(row)
    }

    async fn update(&self, code: &str, changes: CompanyChanges) -> BizResult<Company> {
        let mut tables = self.store.write()?;

        if !tables.companies.contains_key(code) {
            return Err(BizError::not_found("Company", code));
        }
        if tables.name_taken(&changes.name, Some(code)) {
            return Err(EntityError::Conflict {
                entity_type: "Company",
                key: changes.name,
            }
            .into());
        }

        let row = tables
            .companies
            .get_mut(code)
            .ok_or_else(|| BizError::not_found("Company", code))?;
        row.name = changes.name;
        if let Some(description) = changes.description {
            row.description = Some(description);
        }
        Ok(row.clone())
    }

    async fn delete(&self, code: &str) -> BizResult<()> {
        let mut tables = self.store.write()?;

        if tables.companies.remove(code).is_none() {
            return Err(BizError::not_found("Company", code));
        }

        // ON DELETE CASCADE
        tables.invoices.retain(|_, inv| inv.comp_code != code);
        tables.industries.retain(|_, ind| ind.comp_code != code);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct InMemoryInvoiceRepository {
    store: InMemoryStore,
}

impl InMemoryInvoiceRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
    async fn list_all(&self) -> BizResult<Vec<InvoiceSummary>> {
        Ok(self
            .store
            .read()?
            .invoices
            .values()
            .map(InvoiceSummary::from)
            .collect())
    }

    async fn get_by_id(&self, id: i32) -> BizResult<InvoiceDetail> {
        let tables = self.store.read()?;
        let invoice = tables
            .invoices
            .get(&id)
            .cloned()
            .ok_or_else(|| BizError::not_found("Invoice", id))?;
        let company = tables
            .companies
            .get(&invoice.comp_code)
            .cloned()
            .ok_or_else(|| {
                BizError::Internal(format!("Invoice {} has no company row", invoice.id))
            })?;

        Ok(InvoiceDetail::new(invoice, company))
    }

    async fn create(&self, invoice: NewInvoice) -> BizResult<Invoice> {
        let mut tables = self.store.write()?;
        tables.require_company("Invoice", &invoice.comp_code)?;

        tables.last_invoice_id += 1;
        let row = Invoice {
            id: tables.last_invoice_id,
            comp_code: invoice.comp_code,
            amt: invoice.amt,
            paid: false,
            add_date: Utc::now(),
            paid_date: None,
        };
        tables.invoices.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: i32, changes: InvoiceChanges) -> BizResult<Invoice> {
        let mut tables = self.store.write()?;
        let row = tables
            .invoices
            .get_mut(&id)
            .ok_or_else(|| BizError::not_found("Invoice", id))?;

        row.paid_date = row.paid_date_after(changes.paid, Utc::now());
        row.amt = changes.amt;
        row.paid = changes.paid;
        Ok(row.clone())
    }

    async fn delete(&self, id: i32) -> BizResult<()> {
        self.store
            .write()?
            .invoices
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| BizError::not_found("Invoice", id))
    }
}

// ---------------------------------------------------------------------------
// Industries
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct InMemoryIndustryRepository {
    store: InMemoryStore,
}

impl InMemoryIndustryRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl IndustryRepository for InMemoryIndustryRepository {
    async fn list_all(&self) -> BizResult<Vec<Industry>> {
        Ok(self.store.read()?.industries.values().cloned().collect())
    }

    async fn create(&self, industry: NewIndustry) -> BizResult<Industry> {
        let mut tables = self.store.write()?;
        tables.require_company("Industry", &industry.comp_code)?;

        if tables.industries.contains_key(&industry.code) {
            return Err(EntityError::Conflict {
                entity_type: "Industry",
                key: industry.code,
            }
            .into());
        }

        tables
            .industries
            .insert(industry.code.clone(), industry.clone());
        Ok(industry)
    }
}
