//! HTTP-level tests driving the full router against a temp database.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use pennybook_core::fx::ResolverThresholds;
use pennybook_server::{api::app_router, build_state, config::Config};

async fn build_test_router() -> (TempDir, axum::Router) {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config {
        listen_addr: "127.0.0.1:0".to_string(),
        data_dir: tmp.path().to_string_lossy().to_string(),
        // Disabled so oneshot requests need no client address.
        rate_limit_per_second: 0,
        rate_limit_burst: 0,
        resolver_thresholds: ResolverThresholds::default(),
        idempotency_ttl_hours: 24,
    };
    let state = build_state(&config).await.unwrap();
    (tmp, app_router(state, &config))
}

async fn request(
    app: &axum::Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    idempotency_key: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    if let Some(key) = idempotency_key {
        builder = builder.header("Idempotency-Key", key);
    }
    let request = builder
        .body(match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_wallet(app: &axum::Router, name: &str, wallet_type: &str, balance: &str) -> String {
    let (status, body) = request(
        app,
        Method::POST,
        "/api/wallets",
        Some(json!({
            "name": name,
            "walletType": wallet_type,
            "currency": "USD",
            "startingBalance": balance,
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "wallet create failed: {body}");
    body["id"].as_str().unwrap().to_string()
}

async fn create_category(app: &axum::Router, name: &str) -> String {
    let (status, body) = request(
        app,
        Method::POST,
        "/api/categories",
        Some(json!({ "name": name })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "category create failed: {body}");
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn overdraft_on_cash_wallet_is_a_conflict() {
    let (_tmp, app) = build_test_router().await;
    let wallet_id = create_wallet(&app, "Pocket", "CASH", "100").await;
    let category_id = create_category(&app, "Groceries").await;

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/transactions",
        Some(json!({
            "transactionType": "expense",
            "walletId": wallet_id,
            "categoryId": category_id,
            "amount": "150",
            "date": chrono::Utc::now().date_naive().to_string(),
        })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "overdraft_blocked");

    // Balance unchanged.
    let (_, wallet) = request(
        &app,
        Method::GET,
        &format!("/api/wallets/{wallet_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(wallet["currentBalance"], "100");
}

#[tokio::test]
async fn idempotency_key_replays_instead_of_duplicating() {
    let (_tmp, app) = build_test_router().await;
    let wallet_id = create_wallet(&app, "Checking", "BANK", "0").await;
    let category_id = create_category(&app, "Salary").await;

    let payload = json!({
        "transactionType": "income",
        "walletId": wallet_id,
        "categoryId": category_id,
        "amount": "1000",
        "date": chrono::Utc::now().date_naive().to_string(),
    });

    let (status_a, first) = request(
        &app,
        Method::POST,
        "/api/transactions",
        Some(payload.clone()),
        Some("submit-42"),
    )
    .await;
    let (status_b, second) = request(
        &app,
        Method::POST,
        "/api/transactions",
        Some(payload),
        Some("submit-42"),
    )
    .await;

    assert_eq!(status_a, StatusCode::CREATED);
    assert_eq!(status_b, StatusCode::CREATED);
    assert_eq!(first["transaction"]["id"], second["transaction"]["id"]);
    assert_eq!(second["idempotentReplay"], true);

    let (_, wallet) = request(
        &app,
        Method::GET,
        &format!("/api/wallets/{wallet_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(wallet["currentBalance"], "1000");
}

#[tokio::test]
async fn missing_rate_reports_critical_availability() {
    let (_tmp, app) = build_test_router().await;

    let (status, body) = request(
        &app,
        Method::GET,
        "/api/exchange-rates/availability?date=2025-06-01&currency=EUR",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exactMatch"], false);
    assert_eq!(body["requiresManualInput"], true);
    assert_eq!(body["severity"], "critical");
}

#[tokio::test]
async fn availability_uses_fallback_rate_with_severity() {
    let (_tmp, app) = build_test_router().await;

    let (status, _) = request(
        &app,
        Method::POST,
        "/api/exchange-rates",
        Some(json!({
            "fromCurrency": "EUR",
            "toCurrency": "USD",
            "rate": "1.1",
            "rateDate": "2025-05-22",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Ten days later: fallback rate, outdated severity.
    let (status, body) = request(
        &app,
        Method::GET,
        "/api/exchange-rates/availability?date=2025-06-01&currency=EUR",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exactMatch"], false);
    assert_eq!(body["requiresManualInput"], false);
    assert_eq!(body["severity"], "outdated");
    assert_eq!(body["rateDate"], "2025-05-22");
}

#[tokio::test]
async fn validation_error_shape_is_machine_readable() {
    let (_tmp, app) = build_test_router().await;
    let wallet_id = create_wallet(&app, "Pocket", "CASH", "10").await;
    let category_id = create_category(&app, "Misc").await;

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/transactions",
        Some(json!({
            "transactionType": "expense",
            "walletId": wallet_id,
            "categoryId": category_id,
            "amount": "1.999",
            "date": chrono::Utc::now().date_naive().to_string(),
        })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation_error");
    assert!(body["message"].as_str().unwrap().contains("decimal places"));
}

#[tokio::test]
async fn net_worth_sums_wallets_in_base_currency() {
    let (_tmp, app) = build_test_router().await;
    create_wallet(&app, "Pocket", "CASH", "100").await;
    create_wallet(&app, "Checking", "BANK", "250.50").await;

    let (status, body) = request(&app, Method::GET, "/api/reports/net-worth", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currency"], "USD");
    assert_eq!(body["total"], "350.50");
}

#[tokio::test]
async fn settings_update_changes_base_currency() {
    let (_tmp, app) = build_test_router().await;

    let (status, body) = request(
        &app,
        Method::PUT,
        "/api/settings",
        Some(json!({ "baseCurrency": "EUR" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["baseCurrency"], "EUR");

    let (_, body) = request(&app, Method::GET, "/api/settings", None, None).await;
    assert_eq!(body["baseCurrency"], "EUR");
}
