use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use pennybook_core::reports::{
    DateRange, NetWorthSummary, TotalsFilters, TotalsSummary, WalletScope,
};

use super::shared::parse_date_optional;
use crate::{error::ApiResult, main_lib::AppState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TotalsQuery {
    wallet_id: Option<String>,
    date_from: Option<String>,
    date_to: Option<String>,
    category_id: Option<String>,
    /// Comma-separated list.
    tags: Option<String>,
}

async fn totals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TotalsQuery>,
) -> ApiResult<Json<TotalsSummary>> {
    let scope = match query.wallet_id {
        Some(id) => WalletScope::Wallet(id),
        None => WalletScope::All,
    };
    let range = DateRange {
        start: parse_date_optional(query.date_from, "dateFrom")?,
        end: parse_date_optional(query.date_to, "dateTo")?,
    };
    let filters = TotalsFilters {
        category_id: query.category_id,
        tags: query.tags.map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        }),
    };

    let summary = state.reports_service.compute_totals(scope, range, filters)?;
    Ok(Json(summary))
}

async fn net_worth(State(state): State<Arc<AppState>>) -> ApiResult<Json<NetWorthSummary>> {
    let summary = state.reports_service.net_worth()?;
    Ok(Json(summary))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reports/totals", get(totals))
        .route("/reports/net-worth", get(net_worth))
}
