use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{parse_decimal, xlsx_download};
use crate::application::catalog_service::{ImportReport, ItemQuery};
use crate::domain::item::{Item, ItemPatch};
use crate::errors::AppError;
use crate::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemResponse {
    pub id: Uuid,
    pub name: String,
    /// Decimal price as a string, e.g. "35.50"
    pub price: String,
    pub is_active: bool,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            price: item.price.to_string(),
            is_active: item.is_active,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemMutationResponse {
    pub message: String,
    pub item: ItemResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    pub name: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub price: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListItemsParams {
    /// Case-insensitive part of the item name.
    pub search: Option<String>,
    /// Only return items that can be ordered.
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DeleteItemParams {
    /// Must be `true`; deletion is permanent.
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportResponse {
    pub message: String,
    pub report: ImportReport,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /items
///
/// Lists the catalog ordered by name.
#[utoipa::path(
    get,
    path = "/items",
    params(ListItemsParams),
    responses(
        (status = 200, description = "Catalog items", body = [ItemResponse]),
        (status = 502, description = "Backend unavailable"),
    ),
    tag = "items"
)]
pub async fn list_items(
    state: web::Data<AppState>,
    query: web::Query<ListItemsParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let items = state
        .catalog
        .list_items(&ItemQuery {
            name_contains: params.search,
            active_only: params.active_only,
        })
        .await?;
    let body: Vec<ItemResponse> = items.into_iter().map(ItemResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    post,
    path = "/items",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created", body = ItemMutationResponse),
        (status = 400, description = "Invalid name or price"),
    ),
    tag = "items"
)]
pub async fn create_item(
    state: web::Data<AppState>,
    body: web::Json<CreateItemRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let price = parse_decimal("price", &body.price)?;
    let item = state.catalog.create_item(&body.name, price).await?;
    Ok(HttpResponse::Created().json(ItemMutationResponse {
        message: format!("品項「{}」已新增", item.name),
        item: item.into(),
    }))
}

#[utoipa::path(
    patch,
    path = "/items/{id}",
    params(("id" = Uuid, Path, description = "Item UUID")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ItemMutationResponse),
        (status = 400, description = "Invalid or empty update"),
        (status = 404, description = "Item not found"),
    ),
    tag = "items"
)]
pub async fn update_item(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateItemRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let patch = ItemPatch {
        name: body.name,
        price: body
            .price
            .as_deref()
            .map(|p| parse_decimal("price", p))
            .transpose()?,
        is_active: body.is_active,
    };
    let item = state.catalog.update_item(path.into_inner(), patch).await?;
    Ok(HttpResponse::Ok().json(ItemMutationResponse {
        message: format!("品項「{}」已更新", item.name),
        item: item.into(),
    }))
}

#[utoipa::path(
    put,
    path = "/items/{id}/active",
    params(("id" = Uuid, Path, description = "Item UUID")),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Availability changed", body = ItemMutationResponse),
        (status = 404, description = "Item not found"),
    ),
    tag = "items"
)]
pub async fn set_active(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SetActiveRequest>,
) -> Result<HttpResponse, AppError> {
    let item = state
        .catalog
        .set_active(path.into_inner(), body.is_active)
        .await?;
    let status = if item.is_active { "啟用" } else { "停用" };
    Ok(HttpResponse::Ok().json(ItemMutationResponse {
        message: format!("品項「{}」已{}", item.name, status),
        item: item.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/items/{id}",
    params(
        ("id" = Uuid, Path, description = "Item UUID"),
        DeleteItemParams,
    ),
    responses(
        (status = 200, description = "Item deleted"),
        (status = 400, description = "Confirmation missing"),
        (status = 404, description = "Item not found"),
    ),
    tag = "items"
)]
pub async fn delete_item(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<DeleteItemParams>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    state.catalog.delete_item(id, query.confirm).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "品項已刪除",
        "id": id
    })))
}

/// GET /items/export
///
/// Downloads the whole catalog, inactive items included.
#[utoipa::path(
    get,
    path = "/items/export",
    responses(
        (status = 200, description = "Catalog workbook", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ),
    tag = "items"
)]
pub async fn export_items(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(xlsx_download(state.catalog.export_items().await?))
}

/// POST /items/import
///
/// The request body is the raw `.xlsx` file.
#[utoipa::path(
    post,
    path = "/items/import",
    request_body(content = Vec<u8>, content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    responses(
        (status = 200, description = "Import summary", body = ImportResponse),
        (status = 400, description = "Unreadable file or missing columns"),
    ),
    tag = "items"
)]
pub async fn import_items(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let report = state.catalog.import_items(&body).await?;
    Ok(HttpResponse::Ok().json(ImportResponse {
        message: format!(
            "已匯入 {} 筆品項，略過 {} 筆",
            report.inserted,
            report.skipped_invalid + report.skipped_existing
        ),
        report,
    }))
}
