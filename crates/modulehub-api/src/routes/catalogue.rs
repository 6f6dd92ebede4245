//! Public catalogue of registered modules, newest first.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use modulehub_common::{
    error::ModuleHubResult,
    models::module::{CatalogueQuery, Module},
};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(catalogue))
}

#[derive(Serialize)]
struct CatalogueView {
    modules: Vec<Module>,
    page: u32,
    per_page: u32,
    total: i64,
}

/// GET /?page=&query=
async fn catalogue(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CatalogueQuery>,
) -> ModuleHubResult<Json<CatalogueView>> {
    let page = params.page.unwrap_or(1).max(1);
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty());

    let result = state.modules.list(page, state.per_page, query).await?;

    Ok(Json(CatalogueView {
        modules: result.items,
        page: result.page,
        per_page: result.per_page,
        total: result.total,
    }))
}
