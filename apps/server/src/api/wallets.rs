use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;

use pennybook_core::ledger::{NewAdjustment, TransactionOutcome};
use pennybook_core::wallets::{NewWallet, Wallet, WalletUpdate};

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListWalletsQuery {
    /// `active`, `archived`, or `all` (default `active`).
    status: Option<String>,
}

async fn list_wallets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListWalletsQuery>,
) -> ApiResult<Json<Vec<Wallet>>> {
    let archived_filter = match query.status.as_deref() {
        None | Some("active") => Some(false),
        Some("archived") => Some(true),
        _ => None,
    };
    let wallets = state.wallet_service.list_wallets(archived_filter)?;
    Ok(Json(wallets))
}

async fn get_wallet(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Wallet>> {
    let wallet = state.wallet_service.get_wallet(&id)?;
    Ok(Json(wallet))
}

async fn create_wallet(
    State(state): State<Arc<AppState>>,
    Json(new_wallet): Json<NewWallet>,
) -> ApiResult<(StatusCode, Json<Wallet>)> {
    let wallet = state.wallet_service.create_wallet(new_wallet).await?;
    Ok((StatusCode::CREATED, Json(wallet)))
}

async fn update_wallet(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(mut wallet_update): Json<WalletUpdate>,
) -> ApiResult<Json<Wallet>> {
    wallet_update.id = Some(id);
    let wallet = state.wallet_service.update_wallet(wallet_update).await?;
    Ok(Json(wallet))
}

async fn archive_wallet(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Wallet>> {
    let wallet = state.wallet_service.archive_wallet(&id).await?;
    Ok(Json(wallet))
}

async fn restore_wallet(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Wallet>> {
    let wallet = state.wallet_service.restore_wallet(&id).await?;
    Ok(Json(wallet))
}

async fn adjust_balance(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(adjustment): Json<NewAdjustment>,
) -> ApiResult<(StatusCode, Json<TransactionOutcome>)> {
    let outcome = state
        .ledger_service
        .adjust_wallet_balance(&id, adjustment)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/wallets", get(list_wallets).post(create_wallet))
        .route("/wallets/{id}", get(get_wallet).put(update_wallet))
        .route("/wallets/{id}/archive", patch(archive_wallet))
        .route("/wallets/{id}/restore", patch(restore_wallet))
        .route("/wallets/{id}/adjust-balance", post(adjust_balance))
}
