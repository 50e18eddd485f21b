//! REST surface: one router module per domain, assembled under `/api`.

mod categories;
mod exchange_rates;
mod reports;
mod settings;
mod shared;
mod transactions;
mod wallets;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::json;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::SmartIpKeyExtractor;
use tower_governor::{GovernorError, GovernorLayer};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::main_lib::AppState;

/// 429 body carries a machine-readable kind plus the wait in seconds, the
/// same shape as every other API error.
fn rate_limit_error(err: GovernorError) -> Response {
    match err {
        GovernorError::TooManyRequests { wait_time, .. } => {
            let body = json!({
                "kind": "rate_limited",
                "message": format!("Too many requests, retry in {wait_time}s"),
                "retryAfter": wait_time,
            });
            let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
            if let Ok(value) = wait_time.to_string().parse() {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
        GovernorError::UnableToExtractKey => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "kind": "internal_error",
                "message": "Unable to identify request origin",
            })),
        )
            .into_response(),
        GovernorError::Other { msg, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "kind": "internal_error",
                "message": msg.unwrap_or_else(|| "Rate limiter failure".to_string()),
            })),
        )
            .into_response(),
    }
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let mut api = Router::new()
        .merge(transactions::router())
        .merge(wallets::router())
        .merge(exchange_rates::router())
        .merge(categories::router())
        .merge(reports::router())
        .merge(settings::router());

    // A zero rate disables limiting (used by the test harness).
    if config.rate_limit_per_second > 0 {
        let governor_config = Arc::new(
            GovernorConfigBuilder::default()
                .per_second(config.rate_limit_per_second)
                .burst_size(config.rate_limit_burst)
                .key_extractor(SmartIpKeyExtractor)
                .finish()
                .expect("valid rate limiter configuration"),
        );
        api = api.layer(GovernorLayer::new(governor_config).error_handler(rate_limit_error));
    }

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .with_state(state)
}
