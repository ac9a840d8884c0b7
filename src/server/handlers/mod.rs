//! HTTP handlers for companies, invoices and industries
//!
//! Handlers translate requests into repository calls and shape the JSON
//! response. They never render errors themselves: every failure is returned
//! as a [`BizError`](crate::core::BizError) and rendered by its
//! `IntoResponse` implementation.

pub mod companies;
pub mod industries;
pub mod invoices;

use std::sync::Arc;

use crate::core::error::{BizResult, ValidationError};
use crate::core::service::{CompanyRepository, IndustryRepository, InvoiceRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub companies: Arc<dyn CompanyRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
    pub industries: Arc<dyn IndustryRepository>,
}

/// Unwrap a field that `#[validate(required)]` has already checked
fn required<T>(value: Option<T>, field: &str) -> BizResult<T> {
    value.ok_or_else(|| {
        ValidationError::MissingField {
            field: field.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BizError;

    #[test]
    fn test_required_reports_field_name() {
        let err = required::<i32>(None, "amt").unwrap_err();
        assert!(matches!(
            err,
            BizError::Validation(ValidationError::MissingField { ref field }) if field == "amt"
        ));
        assert_eq!(required(Some(3), "amt").unwrap(), 3);
    }
}
