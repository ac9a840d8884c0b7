//! Axum extractors that reject into [`BizError`]
//!
//! Axum's built-in rejections render their own plain-text bodies. These
//! wrappers convert them so that every failure, including malformed input,
//! goes through the single error envelope.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use std::num::IntErrorKind;
use validator::Validate;

use crate::core::error::{BizError, RequestError};

/// Axum extractor that deserializes and validates a JSON body
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_invoice(
///     State(state): State<AppState>,
///     ValidJson(body): ValidJson<CreateInvoiceRequest>,
/// ) -> BizResult<(StatusCode, Json<Value>)> {
///     // body passed `Validate::validate`
/// }
/// ```
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = BizError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state).await.map_err(|e| {
            RequestError::InvalidJson {
                message: e.body_text(),
            }
        })?;

        payload.validate()?;
        Ok(ValidJson(payload))
    }
}

/// Integer invoice id taken from the `{id}` path segment
///
/// Non-integers are a 400; integers outside the id range are a 404.
#[derive(Debug, Clone, Copy)]
pub struct InvoiceId(pub i32);

impl<S> FromRequestParts<S> for InvoiceId
where
    S: Send + Sync,
{
    type Rejection = BizError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| RequestError::InvalidPath {
                value: parts.uri.path().to_string(),
                message: e.body_text(),
            })?;

        raw.parse::<i32>().map(InvoiceId).map_err(|e| match e.kind() {
            // A well-formed integer no invoice id can ever take
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                BizError::not_found("Invoice", &raw)
            }
            _ => RequestError::InvalidPath {
                value: raw.clone(),
                message: e.to_string(),
            }
            .into(),
        })
    }
}
