//! Company handlers
//!
//! - `GET    /companies`        → `{companies: [...]}`
//! - `GET    /companies/{code}` → `{company: {..., invoices: [id, ...]}}`
//! - `POST   /companies`        → 201 `{company: {...}}`
//! - `PATCH  /companies/{code}` → `{company: {...}}`
//! - `DELETE /companies/{code}` → `{status: "deleted"}`

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use super::{AppState, required};
use crate::core::error::BizResult;
use crate::core::model::{CompanyChanges, NewCompany};
use crate::core::slug::slugify;
use crate::server::extractors::ValidJson;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    #[validate(required, custom(function = "validate_sluggable"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCompanyRequest {
    #[validate(required, length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

/// A company name must leave something behind after slugging
fn validate_sluggable(name: &str) -> Result<(), validator::ValidationError> {
    if slugify(name).is_empty() {
        return Err(validator::ValidationError::new("slug")
            .with_message("must contain at least one letter or digit".into()));
    }
    Ok(())
}

pub async fn list_companies(State(state): State<AppState>) -> BizResult<Json<Value>> {
    let companies = state.companies.list_all().await?;
    Ok(Json(json!({ "companies": companies })))
}

pub async fn get_company(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> BizResult<Json<Value>> {
    let company = state.companies.get_by_code(&code).await?;
    Ok(Json(json!({ "company": company })))
}

pub async fn create_company(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CreateCompanyRequest>,
) -> BizResult<(StatusCode, Json<Value>)> {
    let company = state
        .companies
        .create(NewCompany {
            name: required(body.name, "name")?,
            description: body.description,
        })
        .await?;

    tracing::info!(code = %company.code, "company created");
    Ok((StatusCode::CREATED, Json(json!({ "company": company }))))
}

pub async fn update_company(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ValidJson(body): ValidJson<UpdateCompanyRequest>,
) -> BizResult<Json<Value>> {
    let company = state
        .companies
        .update(
            &code,
            CompanyChanges {
                name: required(body.name, "name")?,
                description: body.description,
            },
        )
        .await?;

    tracing::info!(code = %company.code, "company updated");
    Ok(Json(json!({ "company": company })))
}

pub async fn delete_company(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> BizResult<Json<Value>> {
    state.companies.delete(&code).await?;

    tracing::info!(code = %code, "company deleted");
    Ok(Json(json!({ "status": "deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_requires_name() {
        let body: CreateCompanyRequest =
            serde_json::from_value(json!({ "description": "no name" })).unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_create_request_rejects_unsluggable_name() {
        let body: CreateCompanyRequest =
            serde_json::from_value(json!({ "name": "?!" })).unwrap();
        let errors = body.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_create_request_accepts_missing_description() {
        let body: CreateCompanyRequest =
            serde_json::from_value(json!({ "name": "Apple" })).unwrap();
        assert!(body.validate().is_ok());
    }

    #[test]
    fn test_update_request_rejects_empty_name() {
        let body: UpdateCompanyRequest =
            serde_json::from_value(json!({ "name": "" })).unwrap();
        assert!(body.validate().is_err());
    }
}
