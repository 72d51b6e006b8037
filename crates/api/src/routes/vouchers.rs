//! Voucher routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use society_core::ledger::{VoucherFilter, VoucherInput, VoucherType};
use society_shared::types::{OrganizationId, PageRequest, VoucherId};

use crate::AppState;
use crate::error::ApiResult;

/// Creates the voucher routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{org_id}/vouchers",
            get(list_vouchers).post(create_voucher),
        )
        .route(
            "/organizations/{org_id}/vouchers/{voucher_id}",
            get(get_voucher).put(edit_voucher),
        )
}

/// Query parameters for listing vouchers.
#[derive(Debug, Deserialize)]
pub struct ListVouchersQuery {
    /// Only this type.
    pub voucher_type: Option<VoucherType>,
    /// Earliest transaction date.
    pub from: Option<NaiveDate>,
    /// Latest transaction date.
    pub to: Option<NaiveDate>,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Query parameters for editing a voucher.
#[derive(Debug, Deserialize)]
pub struct EditVoucherQuery {
    /// Date the reversal of the original postings is booked on, today when
    /// absent.
    pub edited_on: Option<NaiveDate>,
}

async fn list_vouchers(
    State(state): State<AppState>,
    Path(org_id): Path<OrganizationId>,
    Query(query): Query<ListVouchersQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = VoucherFilter {
        voucher_type: query.voucher_type,
        from: query.from,
        to: query.to,
    };
    let defaults = PageRequest::default();
    let page = PageRequest {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };

    let vouchers = state.vouchers.list(&org_id, &filter, page).await?;
    Ok(Json(vouchers))
}

async fn create_voucher(
    State(state): State<AppState>,
    Path(org_id): Path<OrganizationId>,
    Json(input): Json<VoucherInput>,
) -> ApiResult<impl IntoResponse> {
    let voucher = state.vouchers.create(&org_id, &input).await?;
    Ok((StatusCode::CREATED, Json(voucher)))
}

async fn get_voucher(
    State(state): State<AppState>,
    Path((org_id, voucher_id)): Path<(OrganizationId, VoucherId)>,
) -> ApiResult<impl IntoResponse> {
    let voucher = state.vouchers.get(&org_id, &voucher_id).await?;
    Ok(Json(voucher))
}

async fn edit_voucher(
    State(state): State<AppState>,
    Path((org_id, voucher_id)): Path<(OrganizationId, VoucherId)>,
    Query(query): Query<EditVoucherQuery>,
    Json(input): Json<VoucherInput>,
) -> ApiResult<impl IntoResponse> {
    let edited_on = query.edited_on.unwrap_or_else(|| Utc::now().date_naive());
    let voucher = state
        .vouchers
        .edit(&org_id, &voucher_id, &input, edited_on)
        .await?;
    Ok(Json(voucher))
}
