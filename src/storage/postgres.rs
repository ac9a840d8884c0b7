//! PostgreSQL storage backend using sqlx.
//!
//! [`PgGateway`] owns the connection pool and is the only place that talks to
//! the driver's error type. The three repositories hold a clone of the
//! gateway and issue parameterized statements through it.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! biztime = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! # Schema
//!
//! `companies`, `invoices` and `industries`, created by [`ensure_schema`].
//! Invoices and industries reference `companies(code)` with
//! `ON DELETE CASCADE`.

use crate::core::error::{BizError, BizResult, EntityError, StorageError, ValidationError};
use crate::core::model::{
    Company, CompanyChanges, CompanyDetail, Industry, Invoice, InvoiceChanges, InvoiceDetail,
    InvoiceSummary, NewCompany, NewIndustry, NewInvoice,
};
use crate::core::service::{CompanyRepository, IndustryRepository, InvoiceRepository};
use crate::core::slug::company_code;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

const BACKEND: &str = "PostgreSQL";

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Apply the required tables (idempotent).
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> BizResult<()> {
    let statements = [
        "CREATE TABLE IF NOT EXISTS companies (
            code TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT
        )",
        "CREATE TABLE IF NOT EXISTS invoices (
            id SERIAL PRIMARY KEY,
            comp_code TEXT NOT NULL REFERENCES companies (code) ON DELETE CASCADE,
            amt DOUBLE PRECISION NOT NULL CHECK (amt > 0),
            paid BOOLEAN NOT NULL DEFAULT false,
            add_date TIMESTAMPTZ NOT NULL DEFAULT now(),
            paid_date TIMESTAMPTZ
        )",
        "CREATE INDEX IF NOT EXISTS idx_invoices_comp_code ON invoices (comp_code)",
        "CREATE TABLE IF NOT EXISTS industries (
            code TEXT PRIMARY KEY,
            industry TEXT NOT NULL,
            comp_code TEXT NOT NULL REFERENCES companies (code) ON DELETE CASCADE
        )",
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(query_error)?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Storage gateway over a PostgreSQL connection pool
///
/// Created once by the process entry point and closed by it at shutdown.
#[derive(Clone, Debug)]
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    /// Open a pool against `url`
    pub async fn connect(url: &str, max_connections: u32) -> BizResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| StorageError::Connection {
                backend: BACKEND,
                message: e.to_string(),
            })?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create tables if they are missing
    pub async fn ensure_schema(&self) -> BizResult<()> {
        ensure_schema(&self.pool).await
    }

    /// Close every connection in the pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Any driver failure that has no more specific meaning
fn query_error(err: sqlx::Error) -> BizError {
    StorageError::Query {
        backend: BACKEND,
        message: err.to_string(),
    }
    .into()
}

/// Translate a failed INSERT/UPDATE into the error taxonomy
///
/// Unique violations become `Conflict` on `key`, foreign key violations
/// become `ReferentialViolation` on `comp_code`, and check violations become
/// validation errors.
fn write_error(
    err: sqlx::Error,
    entity_type: &'static str,
    key: &str,
    comp_code: Option<&str>,
) -> BizError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return EntityError::Conflict {
                entity_type,
                key: key.to_string(),
            }
            .into();
        }
        if db.is_foreign_key_violation() {
            return EntityError::ReferentialViolation {
                entity_type,
                referenced: "Company",
                key: comp_code.unwrap_or_default().to_string(),
            }
            .into();
        }
        if db.is_check_violation() {
            return ValidationError::InvalidField {
                field: db.constraint().unwrap_or("row").to_string(),
                message: db.message().to_string(),
            }
            .into();
        }
    }
    query_error(err)
}

// ---------------------------------------------------------------------------
// Companies
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct PostgresCompanyRepository {
    gateway: PgGateway,
}

impl PostgresCompanyRepository {
    pub fn new(gateway: PgGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl CompanyRepository for PostgresCompanyRepository {
    async fn list_all(&self) -> BizResult<Vec<Company>> {
        sqlx::query_as::<_, Company>("SELECT code, name, description FROM companies ORDER BY code")
            .fetch_all(self.gateway.pool())
            .await
            .map_err(query_error)
    }

    async fn get_by_code(&self, code: &str) -> BizResult<CompanyDetail> {
        let company = sqlx::query_as::<_, Company>(
            "SELECT code, name, description FROM companies WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(self.gateway.pool())
        .await
        .map_err(query_error)?
        .ok_or_else(|| BizError::not_found("Company", code))?;

        let invoices = sqlx::query_scalar::<_, i32>(
            "SELECT id FROM invoices WHERE comp_code = $1 ORDER BY id",
        )
        .bind(code)
        .fetch_all(self.gateway.pool())
        .await
        .map_err(query_error)?;

        Ok(CompanyDetail::new(company, invoices))
    }

    async fn create(&self, company: NewCompany) -> BizResult<Company> {
        let code = company_code(&company.name)?;

        sqlx::query_as::<_, Company>(
            "INSERT INTO companies (code, name, description) \
             VALUES ($1, $2, $3) \
             RETURNING code, name, description",
        )
        .bind(&code)
        .bind(&company.name)
        .bind(&company.description)
        .fetch_one(self.gateway.pool())
        .await
        .map_err(|e| write_error(e, "Company", &code, None))
    }

    async fn update(&self, code: &str, changes: CompanyChanges) -> BizResult<Company> {
        sqlx::query_as::<_, Company>(
            "UPDATE companies SET name = $1, description = COALESCE($2, description) \
             WHERE code = $3 \
             RETURNING code, name, description",
        )
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(code)
        .fetch_optional(self.gateway.pool())
        .await
        .map_err(|e| write_error(e, "Company", &changes.name, None))?
        .ok_or_else(|| BizError::not_found("Company", code))
    }

    async fn delete(&self, code: &str) -> BizResult<()> {
        let result = sqlx::query("DELETE FROM companies WHERE code = $1")
            .bind(code)
            .execute(self.gateway.pool())
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(BizError::not_found("Company", code));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

const INVOICE_COLUMNS: &str = "id, comp_code, amt, paid, add_date, paid_date";

/// One row of the invoice/company join
#[derive(sqlx::FromRow)]
struct InvoiceWithCompany {
    id: i32,
    comp_code: String,
    amt: f64,
    paid: bool,
    add_date: DateTime<Utc>,
    paid_date: Option<DateTime<Utc>>,
    name: String,
    description: Option<String>,
}

impl From<InvoiceWithCompany> for InvoiceDetail {
    fn from(row: InvoiceWithCompany) -> Self {
        InvoiceDetail {
            id: row.id,
            amt: row.amt,
            paid: row.paid,
            add_date: row.add_date,
            paid_date: row.paid_date,
            company: Company {
                code: row.comp_code,
                name: row.name,
                description: row.description,
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct PostgresInvoiceRepository {
    gateway: PgGateway,
}

impl PostgresInvoiceRepository {
    pub fn new(gateway: PgGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl InvoiceRepository for PostgresInvoiceRepository {
    async fn list_all(&self) -> BizResult<Vec<InvoiceSummary>> {
        sqlx::query_as::<_, InvoiceSummary>("SELECT id, comp_code FROM invoices ORDER BY id")
            .fetch_all(self.gateway.pool())
            .await
            .map_err(query_error)
    }

    async fn get_by_id(&self, id: i32) -> BizResult<InvoiceDetail> {
        sqlx::query_as::<_, InvoiceWithCompany>(
            "SELECT inv.id, inv.comp_code, inv.amt, inv.paid, inv.add_date, inv.paid_date, \
                    comp.name, comp.description \
             FROM invoices AS inv \
             JOIN companies AS comp ON comp.code = inv.comp_code \
             WHERE inv.id = $1",
        )
        .bind(id)
        .fetch_optional(self.gateway.pool())
        .await
        .map_err(query_error)?
        .map(InvoiceDetail::from)
        .ok_or_else(|| BizError::not_found("Invoice", id))
    }

    async fn create(&self, invoice: NewInvoice) -> BizResult<Invoice> {
        let sql = format!(
            "INSERT INTO invoices (comp_code, amt) VALUES ($1, $2) RETURNING {}",
            INVOICE_COLUMNS
        );

        sqlx::query_as::<_, Invoice>(&sql)
            .bind(&invoice.comp_code)
            .bind(invoice.amt)
            .fetch_one(self.gateway.pool())
            .await
            .map_err(|e| write_error(e, "Invoice", &invoice.comp_code, Some(&invoice.comp_code)))
    }

    async fn update(&self, id: i32, changes: InvoiceChanges) -> BizResult<Invoice> {
        let mut tx = self
            .gateway
            .pool()
            .begin()
            .await
            .map_err(|e| StorageError::Transaction {
                message: e.to_string(),
            })?;

        let select = format!(
            "SELECT {} FROM invoices WHERE id = $1 FOR UPDATE",
            INVOICE_COLUMNS
        );
        let current = sqlx::query_as::<_, Invoice>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_error)?
            .ok_or_else(|| BizError::not_found("Invoice", id))?;

        // Use the store's clock so paid_date can never precede add_date.
        let now: DateTime<Utc> = sqlx::query_scalar("SELECT now()")
            .fetch_one(&mut *tx)
            .await
            .map_err(query_error)?;
        let paid_date = current.paid_date_after(changes.paid, now);

        let update = format!(
            "UPDATE invoices SET amt = $1, paid = $2, paid_date = $3 \
             WHERE id = $4 RETURNING {}",
            INVOICE_COLUMNS
        );
        let updated = sqlx::query_as::<_, Invoice>(&update)
            .bind(changes.amt)
            .bind(changes.paid)
            .bind(paid_date)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| write_error(e, "Invoice", &id.to_string(), None))?;

        tx.commit().await.map_err(|e| StorageError::Transaction {
            message: e.to_string(),
        })?;

        Ok(updated)
    }

    async fn delete(&self, id: i32) -> BizResult<()> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(self.gateway.pool())
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(BizError::not_found("Invoice", id));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Industries
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct PostgresIndustryRepository {
    gateway: PgGateway,
}

impl PostgresIndustryRepository {
    pub fn new(gateway: PgGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl IndustryRepository for PostgresIndustryRepository {
    async fn list_all(&self) -> BizResult<Vec<Industry>> {
        sqlx::query_as::<_, Industry>(
            "SELECT code, industry, comp_code FROM industries ORDER BY code",
        )
        .fetch_all(self.gateway.pool())
        .await
        .map_err(query_error)
    }

    async fn create(&self, industry: NewIndustry) -> BizResult<Industry> {
        sqlx::query_as::<_, Industry>(
            "INSERT INTO industries (code, industry, comp_code) \
             VALUES ($1, $2, $3) \
             RETURNING code, industry, comp_code",
        )
        .bind(&industry.code)
        .bind(&industry.industry)
        .bind(&industry.comp_code)
        .fetch_one(self.gateway.pool())
        .await
        .map_err(|e| write_error(e, "Industry", &industry.code, Some(&industry.comp_code)))
    }
}
