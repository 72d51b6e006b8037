//! Stored bills and penalty quotes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use society_core::billing::{FlatType, NewBill};
use society_shared::types::{BillId, FlatId, OrganizationId};

use crate::AppState;
use crate::error::ApiResult;

/// Creates the bill routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{org_id}/flats/{flat_id}/bills",
            get(list_bills).post(create_bill),
        )
        .route("/organizations/{org_id}/flats/{flat_id}/bills/{bill_id}", get(get_bill))
        .route(
            "/organizations/{org_id}/flats/{flat_id}/bills/{bill_id}/penalty",
            get(get_penalty_quote),
        )
        .route("/organizations/{org_id}/flats/{flat_id}/type", put(set_flat_type))
}

/// Query parameters for a penalty quote.
#[derive(Debug, Deserialize)]
pub struct PenaltyQuery {
    /// Settlement date to quote for, today when absent.
    pub as_of: Option<NaiveDate>,
}

/// Request body for changing a flat's occupancy type.
#[derive(Debug, Deserialize)]
pub struct FlatTypeRequest {
    /// New occupancy type.
    pub flat_type: FlatType,
}

type BillPath = Path<(OrganizationId, FlatId, BillId)>;

async fn create_bill(
    State(state): State<AppState>,
    Path((org_id, flat_id)): Path<(OrganizationId, FlatId)>,
    Json(input): Json<NewBill>,
) -> ApiResult<impl IntoResponse> {
    let bill = state.billing.create_bill(&org_id, &flat_id, input).await?;
    Ok((StatusCode::CREATED, Json(bill)))
}

async fn list_bills(
    State(state): State<AppState>,
    Path((org_id, flat_id)): Path<(OrganizationId, FlatId)>,
) -> ApiResult<impl IntoResponse> {
    let bills = state.billing.list_bills(&org_id, &flat_id).await?;
    Ok(Json(json!({ "bills": bills })))
}

async fn get_bill(
    State(state): State<AppState>,
    Path((org_id, flat_id, bill_id)): BillPath,
) -> ApiResult<impl IntoResponse> {
    let bill = state.billing.get_bill(&org_id, &flat_id, &bill_id).await?;
    Ok(Json(bill))
}

async fn get_penalty_quote(
    State(state): State<AppState>,
    Path((org_id, flat_id, bill_id)): BillPath,
    Query(query): Query<PenaltyQuery>,
) -> ApiResult<impl IntoResponse> {
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let quote = state
        .billing
        .penalty_quote(&org_id, &flat_id, &bill_id, as_of)
        .await?;
    Ok(Json(quote))
}

async fn set_flat_type(
    State(state): State<AppState>,
    Path((org_id, flat_id)): Path<(OrganizationId, FlatId)>,
    Json(request): Json<FlatTypeRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .billing
        .set_flat_type(&org_id, &flat_id, request.flat_type)
        .await?;
    Ok(Json(json!({ "flat_id": flat_id, "flat_type": request.flat_type })))
}
