//! Router tests against the in-memory store.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use tower::ServiceExt;

use society_api::{AppState, create_router};
use society_db::InMemoryDocumentStore;
use society_shared::LedgerSettings;

fn app() -> Router {
    let state = AppState::new(Arc::new(InMemoryDocumentStore::new()), &LedgerSettings::default());
    create_router(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn decimal(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_voucher_create_then_balance() {
    let app = app();
    let (status, voucher) = send(
        &app,
        Method::POST,
        "/api/v1/organizations/org/vouchers",
        Some(json!({
            "voucher_type": "Income",
            "paid_from": { "name": "Maintenance Charges", "group": "Maintenance Income" },
            "paid_to": { "name": "Cash in Hand", "group": "Cash in Hand" },
            "amount": "1,000",
            "transaction_date": "2024-03-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(voucher["voucher_number"], "VCH-00001");

    let uri = format!("/api/v1/organizations/org/vouchers/{}", voucher["id"].as_str().unwrap());
    let (status, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["voucher_number"], "VCH-00001");

    let (status, balance) = send(
        &app,
        Method::GET,
        "/api/v1/organizations/org/ledgers/balance?group=Cash%20in%20Hand&account=Cash%20in%20Hand&as_of=2024-03-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&balance["balance"]), dec!(1000));

    let (status, page) = send(&app, Method::GET, "/api/v1/organizations/org/vouchers?voucher_type=Income", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["meta"]["total"], 1);
}

#[tokio::test]
async fn test_invalid_voucher_is_bad_request() {
    let (status, body) = send(
        &app(),
        Method::POST,
        "/api/v1/organizations/org/vouchers",
        Some(json!({
            "voucher_type": "Journal",
            "paid_from": { "name": "HDFC", "group": "Bank Accounts" },
            "paid_to": { "name": "HDFC", "group": "Bank Accounts" },
            "amount": "10",
            "transaction_date": "2024-03-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "SAME_ACCOUNT");
    assert_eq!(body["retryable"], false);
}

#[tokio::test]
async fn test_missing_voucher_is_not_found() {
    let (status, body) = send(&app(), Method::GET, "/api/v1/organizations/org/vouchers/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "VOUCHER_NOT_FOUND");
}

#[tokio::test]
async fn test_advance_then_delete_restores_wallet() {
    let app = app();
    let (status, record) = send(
        &app,
        Method::POST,
        "/api/v1/organizations/org/flats/A-101/advances",
        Some(json!({
            "amount": "500",
            "account": { "name": "HDFC", "group": "Bank Accounts" },
            "payment_mode": "UPI",
            "transaction_date": "2024-04-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["origin"], "admin");

    let balance_uri = "/api/v1/organizations/org/flats/A-101/balance?series=current&as_of=2024-04-30";
    let (_, balance) = send(&app, Method::GET, balance_uri, None).await;
    assert_eq!(decimal(&balance["balance"]), dec!(500));

    let uri = format!(
        "/api/v1/organizations/org/flats/A-101/uncleared/{}?deleted_on=2024-04-10",
        record["transaction_id"].as_str().unwrap()
    );
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, balance) = send(&app, Method::GET, balance_uri, None).await;
    assert_eq!(decimal(&balance["balance"]), Decimal::ZERO);

    let (_, records) = send(&app, Method::GET, "/api/v1/organizations/org/flats/A-101/uncleared", None).await;
    assert_eq!(records["records"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_refund_beyond_wallet_is_rejected() {
    let (status, body) = send(
        &app(),
        Method::POST,
        "/api/v1/organizations/org/flats/A-101/refunds",
        Some(json!({
            "amount": "50",
            "account": { "name": "Cash in Hand", "group": "Cash in Hand" },
            "transaction_date": "2024-04-01"
        })),
    )
    .await;
    assert!(status.is_client_error());
    assert_eq!(body["error"], "INSUFFICIENT_BALANCE");
}
