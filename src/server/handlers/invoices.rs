//! Invoice handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use super::{AppState, required};
use crate::core::error::BizResult;
use crate::core::model::{InvoiceChanges, NewInvoice};
use crate::server::extractors::{InvoiceId, ValidJson};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    #[validate(required, length(min = 1, message = "must not be empty"))]
    pub comp_code: Option<String>,
    #[validate(required, range(exclusive_min = 0.0, message = "must be greater than zero"))]
    pub amt: Option<f64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateInvoiceRequest {
    #[validate(required, range(exclusive_min = 0.0, message = "must be greater than zero"))]
    pub amt: Option<f64>,
    #[validate(required)]
    pub paid: Option<bool>,
}

/// GET /invoices → `{invoices: [{id, comp_code}, ...]}`
pub async fn list_invoices(State(state): State<AppState>) -> BizResult<Json<Value>> {
    let invoices = state.invoices.list_all().await?;
    Ok(Json(json!({ "invoices": invoices })))
}

/// GET /invoices/{id} → `{invoice: {id, amt, paid, add_date, paid_date, company}}`
pub async fn get_invoice(
    State(state): State<AppState>,
    InvoiceId(id): InvoiceId,
) -> BizResult<Json<Value>> {
    let invoice = state.invoices.get_by_id(id).await?;
    Ok(Json(json!({ "invoice": invoice })))
}

/// POST /invoices → 201 `{invoice: {id, comp_code, amt, paid, add_date, paid_date}}`
pub async fn create_invoice(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CreateInvoiceRequest>,
) -> BizResult<(StatusCode, Json<Value>)> {
    let invoice = state
        .invoices
        .create(NewInvoice {
            comp_code: required(body.comp_code, "comp_code")?,
            amt: required(body.amt, "amt")?,
        })
        .await?;

    tracing::info!(id = invoice.id, comp_code = %invoice.comp_code, "invoice created");
    Ok((StatusCode::CREATED, Json(json!({ "invoice": invoice }))))
}

/// PATCH /invoices/{id} with `{amt, paid}`
///
/// Paying an unpaid invoice stamps `paid_date`; marking it unpaid clears it.
pub async fn update_invoice(
    State(state): State<AppState>,
    InvoiceId(id): InvoiceId,
    ValidJson(body): ValidJson<UpdateInvoiceRequest>,
) -> BizResult<Json<Value>> {
    let invoice = state
        .invoices
        .update(
            id,
            InvoiceChanges {
                amt: required(body.amt, "amt")?,
                paid: required(body.paid, "paid")?,
            },
        )
        .await?;

    tracing::info!(id = invoice.id, paid = invoice.paid, "invoice updated");
    Ok(Json(json!({ "invoice": invoice })))
}

pub async fn delete_invoice(
    State(state): State<AppState>,
    InvoiceId(id): InvoiceId,
) -> BizResult<Json<Value>> {
    state.invoices.delete(id).await?;

    tracing::info!(id, "invoice deleted");
    Ok(Json(json!({ "status": "deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_requires_both_fields() {
        let body: UpdateInvoiceRequest = serde_json::from_value(json!({})).unwrap();
        let errors = body.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("amt"));
        assert!(fields.contains_key("paid"));
    }

    #[test]
    fn test_create_request_rejects_non_positive_amount() {
        let body: CreateInvoiceRequest =
            serde_json::from_value(json!({ "comp_code": "apple", "amt": 0 })).unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_create_request_accepts_integer_amount() {
        let body: CreateInvoiceRequest =
            serde_json::from_value(json!({ "comp_code": "apple", "amt": 100 })).unwrap();
        assert!(body.validate().is_ok());
        assert_eq!(body.amt, Some(100.0));
    }
}
