//! Entity types for companies, invoices and industries
//!
//! Row types mirror the columns of their table. The `New*` and `*Changes`
//! types carry validated input from the HTTP layer into the repositories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A company, keyed by its slug `code`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Company {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

/// A company together with the ids of the invoices it owns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetail {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub invoices: Vec<i32>,
}

impl CompanyDetail {
    pub fn new(company: Company, invoices: Vec<i32>) -> Self {
        Self {
            code: company.code,
            name: company.name,
            description: company.description,
            invoices,
        }
    }
}

/// A full invoice row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: i32,
    pub comp_code: String,
    pub amt: f64,
    pub paid: bool,
    pub add_date: DateTime<Utc>,
    pub paid_date: Option<DateTime<Utc>>,
}

impl Invoice {
    /// Compute `paid_date` for a requested `paid` value.
    ///
    /// Paying an unpaid invoice stamps `now`, marking it unpaid clears the
    /// date, and re-paying a paid invoice keeps the original date.
    pub fn paid_date_after(&self, paid: bool, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match (self.paid, paid) {
            (false, true) => Some(now),
            (_, false) => None,
            (true, true) => self.paid_date,
        }
    }
}

/// The `(id, comp_code)` summary used by the invoice listing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct InvoiceSummary {
    pub id: i32,
    pub comp_code: String,
}

impl From<&Invoice> for InvoiceSummary {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: invoice.id,
            comp_code: invoice.comp_code.clone(),
        }
    }
}

/// An invoice joined with its owning company
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceDetail {
    pub id: i32,
    pub amt: f64,
    pub paid: bool,
    pub add_date: DateTime<Utc>,
    pub paid_date: Option<DateTime<Utc>>,
    pub company: Company,
}

impl InvoiceDetail {
    pub fn new(invoice: Invoice, company: Company) -> Self {
        Self {
            id: invoice.id,
            amt: invoice.amt,
            paid: invoice.paid,
            add_date: invoice.add_date,
            paid_date: invoice.paid_date,
            company,
        }
    }
}

/// An industry tag attached to a company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Industry {
    pub code: String,
    pub industry: String,
    pub comp_code: String,
}

/// Input for creating a company. `code` is derived from `name` by the repository.
#[derive(Debug, Clone)]
pub struct NewCompany {
    pub name: String,
    pub description: Option<String>,
}

/// Input for updating a company. A `None` description keeps the stored one,
/// so an update cannot clear a description once set.
#[derive(Debug, Clone)]
pub struct CompanyChanges {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub comp_code: String,
    pub amt: f64,
}

#[derive(Debug, Clone)]
pub struct InvoiceChanges {
    pub amt: f64,
    pub paid: bool,
}

pub type NewIndustry = Industry;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn invoice(paid: bool, paid_date: Option<DateTime<Utc>>) -> Invoice {
        Invoice {
            id: 1,
            comp_code: "apple".to_string(),
            amt: 100.0,
            paid,
            add_date: Utc::now() - Duration::days(3),
            paid_date,
        }
    }

    #[test]
    fn test_paying_unpaid_invoice_stamps_now() {
        let now = Utc::now();
        let inv = invoice(false, None);
        let paid_date = inv.paid_date_after(true, now);
        assert_eq!(paid_date, Some(now));
        assert!(paid_date.unwrap() >= inv.add_date);
    }

    #[test]
    fn test_unpaying_clears_date() {
        let inv = invoice(true, Some(Utc::now() - Duration::days(1)));
        assert_eq!(inv.paid_date_after(false, Utc::now()), None);
    }

    #[test]
    fn test_repaying_keeps_original_date() {
        let original = Utc::now() - Duration::days(1);
        let inv = invoice(true, Some(original));
        assert_eq!(inv.paid_date_after(true, Utc::now()), Some(original));
    }

    #[test]
    fn test_unpaid_stays_unpaid() {
        let inv = invoice(false, None);
        assert_eq!(inv.paid_date_after(false, Utc::now()), None);
    }

    #[test]
    fn test_company_detail_serializes_invoice_ids() {
        let detail = CompanyDetail::new(
            Company {
                code: "ibm".to_string(),
                name: "IBM".to_string(),
                description: Some("Big blue.".to_string()),
            },
            vec![4, 7],
        );
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["invoices"], serde_json::json!([4, 7]));
        assert_eq!(json["code"], "ibm");
    }
}
