use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use pennybook_core::fx::{ExchangeRate, NewExchangeRate, RateSeverity};

use super::shared::parse_date;
use crate::{error::ApiResult, main_lib::AppState};

async fn list_rates(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<ExchangeRate>>> {
    let rates = state.fx_service.list_rates()?;
    Ok(Json(rates))
}

async fn add_rate(
    State(state): State<Arc<AppState>>,
    Json(new_rate): Json<NewExchangeRate>,
) -> ApiResult<(StatusCode, Json<ExchangeRate>)> {
    let rate = state.fx_service.add_manual_rate(new_rate).await?;
    Ok((StatusCode::CREATED, Json(rate)))
}

async fn delete_rate(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.fx_service.delete_rate(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityQuery {
    date: String,
    currency: String,
    /// Defaults to the base currency.
    to_currency: Option<String>,
}

/// What the transaction drawer shows before submitting a cross-currency
/// entry: whether a rate exists for the date, how stale the fallback is, and
/// whether the user must type one in.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityResponse {
    exact_match: bool,
    requires_manual_input: bool,
    severity: RateSeverity,
    rate_date: Option<chrono::NaiveDate>,
    rate_display: Option<String>,
}

async fn rate_availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<Json<AvailabilityResponse>> {
    let date = parse_date(&query.date, "date")?;
    let to_currency = query
        .to_currency
        .unwrap_or_else(|| state.base_currency.read().unwrap().clone());

    let resolution = state
        .fx_service
        .resolve_rate(&query.currency, &to_currency, date)?;

    Ok(Json(AvailabilityResponse {
        exact_match: resolution.exact_match,
        requires_manual_input: resolution.requires_manual_input,
        severity: resolution.severity,
        rate_date: resolution.rate_date,
        rate_display: resolution.rate.map(|r| r.round_dp(6).to_string()),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/exchange-rates", get(list_rates).post(add_rate))
        .route("/exchange-rates/availability", get(rate_availability))
        .route("/exchange-rates/{id}", delete(delete_rate))
}
