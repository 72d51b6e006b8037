//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST routes for vouchers, flat payments, bills, and balances
//! - Mapping of service errors to JSON error responses

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use society_db::{BillingService, DocumentStore, UnclearedBalanceService, VoucherService};
use society_shared::LedgerSettings;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Voucher posting and ledger reads.
    pub vouchers: Arc<VoucherService>,
    /// Flat payments, advances, and refunds.
    pub uncleared: Arc<UnclearedBalanceService>,
    /// Stored bills and penalty quotes.
    pub billing: Arc<BillingService>,
}

impl AppState {
    /// Builds every service over one document store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, settings: &LedgerSettings) -> Self {
        Self {
            vouchers: Arc::new(VoucherService::new(Arc::clone(&store), settings)),
            uncleared: Arc::new(UnclearedBalanceService::new(Arc::clone(&store), settings)),
            billing: Arc::new(BillingService::new(store)),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
