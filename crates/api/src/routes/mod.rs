//! API route definitions.

use axum::{Json, Router, routing::get};
use serde_json::json;

use crate::AppState;

pub mod bills;
pub mod ledgers;
pub mod payments;
pub mod vouchers;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/health",
            get(|| async { Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") })) }),
        )
        .merge(vouchers::routes())
        .merge(ledgers::routes())
        .merge(payments::routes())
        .merge(bills::routes())
}
