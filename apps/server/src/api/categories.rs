use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;

use pennybook_core::categories::{Category, NewCategory};

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListCategoriesQuery {
    /// Include the system categories backing opening balances and
    /// adjustments. User-facing pickers leave this off.
    #[serde(default)]
    include_system: bool,
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListCategoriesQuery>,
) -> ApiResult<Json<Vec<Category>>> {
    let categories = if query.include_system {
        state.category_service.list_all_categories()?
    } else {
        state.category_service.list_categories()?
    };
    Ok(Json(categories))
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(new_category): Json<NewCategory>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = state.category_service.create_category(new_category).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn delete_category(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.category_service.delete_category(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}", delete(delete_category))
}
