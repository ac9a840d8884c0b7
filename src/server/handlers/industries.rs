//! Industry handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use super::{AppState, required};
use crate::core::error::BizResult;
use crate::core::model::NewIndustry;
use crate::server::extractors::ValidJson;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateIndustryRequest {
    #[validate(required, length(min = 1, message = "must not be empty"))]
    pub code: Option<String>,
    #[validate(required, length(min = 1, message = "must not be empty"))]
    pub industry: Option<String>,
    #[validate(required, length(min = 1, message = "must not be empty"))]
    pub comp_code: Option<String>,
}

/// GET /industries → `{industries: [{code, industry, comp_code}, ...]}`
pub async fn list_industries(State(state): State<AppState>) -> BizResult<Json<Value>> {
    let industries = state.industries.list_all().await?;
    Ok(Json(json!({ "industries": industries })))
}

/// POST /industries → 201 `{industry: {code, industry, comp_code}}`
pub async fn create_industry(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CreateIndustryRequest>,
) -> BizResult<(StatusCode, Json<Value>)> {
    let industry = state
        .industries
        .create(NewIndustry {
            code: required(body.code, "code")?,
            industry: required(body.industry, "industry")?,
            comp_code: required(body.comp_code, "comp_code")?,
        })
        .await?;

    tracing::info!(code = %industry.code, comp_code = %industry.comp_code, "industry created");
    Ok((StatusCode::CREATED, Json(json!({ "industry": industry }))))
}
