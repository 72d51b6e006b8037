//! Ledger balances and the account options behind the voucher forms.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use society_core::ledger::AccountOption;
use society_shared::types::OrganizationId;

use crate::AppState;
use crate::error::ApiResult;

/// Creates the ledger routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations/{org_id}/ledgers/balance", get(get_ledger_balance))
        .route(
            "/organizations/{org_id}/accounts",
            get(list_accounts).post(register_account),
        )
}

/// Query parameters for a ledger balance.
#[derive(Debug, Deserialize)]
pub struct LedgerBalanceQuery {
    /// Account group.
    pub group: String,
    /// Account name.
    pub account: String,
    /// Balance date, today when absent.
    pub as_of: Option<NaiveDate>,
}

async fn get_ledger_balance(
    State(state): State<AppState>,
    Path(org_id): Path<OrganizationId>,
    Query(query): Query<LedgerBalanceQuery>,
) -> ApiResult<impl IntoResponse> {
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let balance = state
        .vouchers
        .ledger_balance(&org_id, &query.group, &query.account, as_of)
        .await?;

    Ok(Json(json!({
        "group": query.group,
        "account": query.account,
        "as_of": as_of,
        "balance": balance,
    })))
}

async fn list_accounts(
    State(state): State<AppState>,
    Path(org_id): Path<OrganizationId>,
) -> ApiResult<impl IntoResponse> {
    let accounts = state.vouchers.account_options(&org_id).await?;
    Ok(Json(json!({ "accounts": accounts })))
}

async fn register_account(
    State(state): State<AppState>,
    Path(org_id): Path<OrganizationId>,
    Json(account): Json<AccountOption>,
) -> ApiResult<impl IntoResponse> {
    state.vouchers.register_account(&org_id, &account).await?;
    Ok((StatusCode::CREATED, Json(account)))
}
