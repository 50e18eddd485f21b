use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use pennybook_core::ledger::{
    BulkDeleteResult, NewTransaction, Transaction, TransactionFilters, TransactionOutcome,
    TransactionSearchResponse, TransactionUpdate,
};

use super::shared::{idempotency_key, parse_date_optional};
use crate::{error::ApiResult, main_lib::AppState};

async fn create_transaction(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(new_transaction): Json<NewTransaction>,
) -> ApiResult<(StatusCode, Json<TransactionOutcome>)> {
    let outcome = state
        .ledger_service
        .create_transaction(new_transaction, idempotency_key(&headers))
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn update_transaction(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<NewTransaction>,
) -> ApiResult<Json<TransactionOutcome>> {
    let update = TransactionUpdate {
        id,
        kind: body.kind,
        amount: body.amount,
        date: body.date,
        description: body.description,
        tags: body.tags,
        manual_exchange_rate: body.manual_exchange_rate,
    };
    let outcome = state
        .ledger_service
        .update_transaction(update, idempotency_key(&headers))
        .await?;
    Ok(Json(outcome))
}

async fn get_transaction(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Transaction>> {
    let transaction = state.ledger_service.get_transaction(&id)?;
    Ok(Json(transaction))
}

async fn delete_transaction(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Transaction>> {
    let deleted = state.ledger_service.delete_transaction(&id).await?;
    Ok(Json(deleted))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkDeleteBody {
    transaction_ids: Vec<String>,
}

async fn bulk_delete_transactions(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BulkDeleteBody>,
) -> ApiResult<Json<BulkDeleteResult>> {
    let result = state
        .ledger_service
        .bulk_delete_transactions(body.transaction_ids)
        .await?;
    Ok(Json(result))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionSearchBody {
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default = "default_page_size")]
    page_size: i64,
    wallet_id: Option<String>,
    transaction_types: Option<Vec<String>>,
    category_id: Option<String>,
    tags: Option<Vec<String>>,
    date_from: Option<String>,
    date_to: Option<String>,
    #[serde(default)]
    include_system: bool,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    50
}

async fn search_transactions(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TransactionSearchBody>,
) -> ApiResult<Json<TransactionSearchResponse>> {
    let filters = TransactionFilters {
        wallet_id: body.wallet_id,
        kinds: body.transaction_types,
        category_id: body.category_id,
        tags: body.tags,
        date_from: parse_date_optional(body.date_from, "dateFrom")?,
        date_to: parse_date_optional(body.date_to, "dateTo")?,
        include_system: body.include_system,
    };
    let response = state
        .ledger_service
        .search_transactions(&filters, body.page, body.page_size)?;
    Ok(Json(response))
}

async fn list_tags(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<String>>> {
    let tags = state.ledger_service.list_tags()?;
    Ok(Json(tags))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/transactions", post(create_transaction))
        .route("/transactions/search", post(search_transactions))
        .route("/transactions/bulk-delete", post(bulk_delete_transactions))
        .route(
            "/transactions/{id}",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
        .route("/tags", get(list_tags))
}
