use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::items::ItemResponse;
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogResponse {
    pub items: Vec<ItemResponse>,
    pub suggestion_limit: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SuggestionParams {
    /// Text typed into an item name field.
    #[serde(default)]
    pub q: String,
}

/// GET /order-form/catalog
///
/// Active items a new order can use, loaded once per opened form.
#[utoipa::path(
    get,
    path = "/order-form/catalog",
    responses(
        (status = 200, description = "Active catalog snapshot", body = CatalogResponse),
        (status = 502, description = "Backend unavailable"),
    ),
    tag = "order-form"
)]
pub async fn catalog(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let snapshot = state.order_entry.load_catalog().await?;
    Ok(HttpResponse::Ok().json(CatalogResponse {
        suggestion_limit: snapshot.suggestion_limit(),
        items: snapshot
            .items()
            .iter()
            .cloned()
            .map(ItemResponse::from)
            .collect(),
    }))
}

/// GET /order-form/suggestions
///
/// Stateless lookup: every call reloads the active catalog from the backend.
/// A form that already holds `/order-form/catalog` should filter that copy
/// per keystroke and call this only for one-off lookups.
#[utoipa::path(
    get,
    path = "/order-form/suggestions",
    params(SuggestionParams),
    responses(
        (status = 200, description = "Matching active items, read fresh from the catalog on every call", body = [ItemResponse]),
        (status = 502, description = "Backend unavailable"),
    ),
    tag = "order-form"
)]
pub async fn suggestions(
    state: web::Data<AppState>,
    query: web::Query<SuggestionParams>,
) -> Result<HttpResponse, AppError> {
    let snapshot = state.order_entry.load_catalog().await?;
    let body: Vec<ItemResponse> = snapshot
        .suggest(&query.q)
        .into_iter()
        .map(ItemResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(body))
}
