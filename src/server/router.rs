//! Route table for the REST API
//!
//! - `/companies`, `/companies/{code}`
//! - `/invoices`, `/invoices/{id}`
//! - `/industries`
//! - `/health`, `/healthz`
//!
//! Anything else falls through to [`not_found`], which answers with the
//! standard 404 error envelope.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::companies::{
    create_company, delete_company, get_company, list_companies, update_company,
};
use super::handlers::industries::{create_industry, list_industries};
use super::handlers::invoices::{
    create_invoice, delete_invoice, get_invoice, list_invoices, update_invoice,
};
use super::handlers::AppState;
use crate::core::error::{BizError, RequestError};

/// Build the full router with state, fallback and request tracing
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(entity_routes(state))
        .fallback(not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// CRUD routes for the three entities
///
/// `PUT` is accepted as an alias of `PATCH` for updates.
pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route(
            "/companies/{code}",
            get(get_company)
                .patch(update_company)
                .put(update_company)
                .delete(delete_company),
        )
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route(
            "/invoices/{id}",
            get(get_invoice)
                .patch(update_invoice)
                .put(update_invoice)
                .delete(delete_invoice),
        )
        .route("/industries", get(list_industries).post(create_industry))
        .with_state(state)
}

fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "biztime"
    }))
}

/// Fallback for unmatched routes
pub async fn not_found() -> BizError {
    RequestError::RouteNotFound.into()
}
