//! Flat wallet routes: advances, refunds, bill payments, and the uncleared
//! record lifecycle.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use society_core::ledger::FlatSeries;
use society_core::uncleared::{PaymentInput, RecordOrigin, WalletMovementInput};
use society_shared::types::{FlatId, OrganizationId, TransactionId};

use crate::AppState;
use crate::error::ApiResult;

/// Creates the flat payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations/{org_id}/flats/{flat_id}/advances", post(create_advance))
        .route("/organizations/{org_id}/flats/{flat_id}/refunds", post(create_refund))
        .route("/organizations/{org_id}/flats/{flat_id}/payments", post(create_payment))
        .route("/organizations/{org_id}/flats/{flat_id}/balance", get(get_flat_balance))
        .route(
            "/organizations/{org_id}/flats/{flat_id}/balance/history",
            get(get_flat_history),
        )
        .route("/organizations/{org_id}/flats/{flat_id}/uncleared", get(list_records))
        .route(
            "/organizations/{org_id}/flats/{flat_id}/uncleared/{transaction_id}",
            get(get_record).delete(delete_record),
        )
        .route(
            "/organizations/{org_id}/flats/{flat_id}/uncleared/{transaction_id}/clear",
            post(clear_record),
        )
        .route(
            "/organizations/{org_id}/flats/{flat_id}/uncleared/{transaction_id}/approve",
            post(approve_record),
        )
        .route(
            "/organizations/{org_id}/flats/{flat_id}/uncleared/{transaction_id}/checkout",
            post(check_out_record),
        )
}

type RecordPath = Path<(OrganizationId, FlatId, TransactionId)>;

/// Advance or refund form plus who entered it.
#[derive(Debug, Deserialize)]
pub struct WalletMovementRequest {
    /// Movement details.
    #[serde(flatten)]
    pub input: WalletMovementInput,
    /// Defaults to admin.
    #[serde(default)]
    pub origin: Option<RecordOrigin>,
}

/// Bill payment form.
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    /// Payment details.
    #[serde(flatten)]
    pub input: PaymentInput,
    /// Admin entry settled immediately instead of awaiting clearance.
    #[serde(default)]
    pub settle_now: bool,
}

/// Query parameters for a flat balance.
#[derive(Debug, Deserialize)]
pub struct FlatBalanceQuery {
    /// `current` or `deposit`.
    #[serde(default)]
    pub series: FlatSeries,
    /// Balance date, today when absent.
    pub as_of: Option<NaiveDate>,
}

/// Query parameters for deleting a record.
#[derive(Debug, Deserialize)]
pub struct DeleteRecordQuery {
    /// Date the reversal is booked on, today when absent.
    pub deleted_on: Option<NaiveDate>,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

async fn create_advance(
    State(state): State<AppState>,
    Path((org_id, flat_id)): Path<(OrganizationId, FlatId)>,
    Json(request): Json<WalletMovementRequest>,
) -> ApiResult<impl IntoResponse> {
    let origin = request.origin.unwrap_or(RecordOrigin::Admin);
    let record = state
        .uncleared
        .create_advance(&org_id, &flat_id, &request.input, origin)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn create_refund(
    State(state): State<AppState>,
    Path((org_id, flat_id)): Path<(OrganizationId, FlatId)>,
    Json(request): Json<WalletMovementRequest>,
) -> ApiResult<impl IntoResponse> {
    let origin = request.origin.unwrap_or(RecordOrigin::Admin);
    let record = state
        .uncleared
        .create_refund(&org_id, &flat_id, &request.input, origin)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn create_payment(
    State(state): State<AppState>,
    Path((org_id, flat_id)): Path<(OrganizationId, FlatId)>,
    Json(request): Json<PaymentRequest>,
) -> ApiResult<impl IntoResponse> {
    let record = if request.settle_now {
        state.uncleared.settle_direct(&org_id, &flat_id, &request.input).await?
    } else {
        state.uncleared.submit_payment(&org_id, &flat_id, &request.input).await?
    };
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_flat_balance(
    State(state): State<AppState>,
    Path((org_id, flat_id)): Path<(OrganizationId, FlatId)>,
    Query(query): Query<FlatBalanceQuery>,
) -> ApiResult<impl IntoResponse> {
    let as_of = query.as_of.unwrap_or_else(today);
    let balance = state
        .uncleared
        .flat_balance(&org_id, &flat_id, query.series, as_of)
        .await?;

    Ok(Json(json!({
        "flat_id": flat_id,
        "series": query.series,
        "as_of": as_of,
        "balance": balance,
    })))
}

async fn get_flat_history(
    State(state): State<AppState>,
    Path((org_id, flat_id)): Path<(OrganizationId, FlatId)>,
    Query(query): Query<FlatBalanceQuery>,
) -> ApiResult<impl IntoResponse> {
    let entries = state
        .uncleared
        .flat_history(&org_id, &flat_id, query.series)
        .await?;
    Ok(Json(json!({ "series": query.series, "entries": entries })))
}

async fn list_records(
    State(state): State<AppState>,
    Path((org_id, flat_id)): Path<(OrganizationId, FlatId)>,
) -> ApiResult<impl IntoResponse> {
    let records = state.uncleared.list(&org_id, &flat_id).await?;
    Ok(Json(json!({ "records": records })))
}

async fn get_record(
    State(state): State<AppState>,
    Path((org_id, flat_id, transaction_id)): RecordPath,
) -> ApiResult<impl IntoResponse> {
    let record = state.uncleared.get(&org_id, &flat_id, &transaction_id).await?;
    Ok(Json(record))
}

async fn clear_record(
    State(state): State<AppState>,
    Path((org_id, flat_id, transaction_id)): RecordPath,
) -> ApiResult<impl IntoResponse> {
    let record = state.uncleared.clear(&org_id, &flat_id, &transaction_id).await?;
    Ok(Json(record))
}

async fn approve_record(
    State(state): State<AppState>,
    Path((org_id, flat_id, transaction_id)): RecordPath,
) -> ApiResult<impl IntoResponse> {
    let record = state.uncleared.approve(&org_id, &flat_id, &transaction_id).await?;
    Ok(Json(record))
}

async fn check_out_record(
    State(state): State<AppState>,
    Path((org_id, flat_id, transaction_id)): RecordPath,
) -> ApiResult<impl IntoResponse> {
    let record = state.uncleared.check_out(&org_id, &flat_id, &transaction_id).await?;
    Ok(Json(record))
}

async fn delete_record(
    State(state): State<AppState>,
    Path((org_id, flat_id, transaction_id)): RecordPath,
    Query(query): Query<DeleteRecordQuery>,
) -> ApiResult<impl IntoResponse> {
    let deleted_on = query.deleted_on.unwrap_or_else(today);
    state
        .uncleared
        .delete(&org_id, &flat_id, &transaction_id, deleted_on)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
