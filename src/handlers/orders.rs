use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::xlsx_download;
use crate::application::order_form::OrderForm;
use crate::domain::catalog::CatalogSnapshot;
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderFilter, OrderLine, PaymentStatus};
use crate::errors::AppError;
use crate::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderLineRequest {
    pub item_name: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    /// `unpaid`, `paid`, `deposit` or their labels. Defaults to `unpaid`.
    pub payment_status: Option<String>,
    /// `YYYY-MM-DD`; today when omitted.
    pub pickup_date: Option<String>,
    /// `HH:MM` or `HH:MM:SS`.
    pub pickup_time: Option<String>,
    #[serde(default)]
    pub notes: String,
    pub lines: Vec<CreateOrderLineRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineResponse {
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: String,
    pub subtotal: String,
}

impl From<&OrderLine> for OrderLineResponse {
    fn from(line: &OrderLine) -> Self {
        Self {
            item_name: line.item_name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price.to_string(),
            subtotal: line.subtotal().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub payment_status: String,
    pub payment_status_label: String,
    pub pickup_date: String,
    pub pickup_time: String,
    pub notes: String,
    pub lines: Vec<OrderLineResponse>,
    pub item_summary: String,
    pub total_amount: String,
    pub is_completed: bool,
    pub created_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            item_summary: order.item_summary(),
            lines: order.lines.iter().map(OrderLineResponse::from).collect(),
            customer_name: order.customer_name,
            customer_phone: order.customer_phone,
            payment_status: order.payment_status.as_str().to_string(),
            payment_status_label: order.payment_status.label().to_string(),
            pickup_date: order.pickup_date.format("%Y-%m-%d").to_string(),
            pickup_time: order.pickup_time.format("%H:%M").to_string(),
            notes: order.notes,
            total_amount: order.total_amount.to_string(),
            is_completed: order.is_completed,
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderMutationResponse {
    pub message: String,
    pub order: OrderResponse,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListOrdersParams {
    /// Hide orders that were already picked up.
    #[serde(default)]
    pub only_incomplete: bool,
    /// Earliest pickup date, inclusive.
    pub pickup_from: Option<NaiveDate>,
    /// Latest pickup date, inclusive.
    pub pickup_to: Option<NaiveDate>,
    pub payment_status: Option<String>,
    /// Matches customer name, phone or ordered items.
    #[serde(default)]
    pub search: String,
}

impl ListOrdersParams {
    fn filter(&self) -> Result<OrderFilter, AppError> {
        let payment_status = self
            .payment_status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::parse::<PaymentStatus>)
            .transpose()?;
        Ok(OrderFilter {
            only_incomplete: self.only_incomplete,
            pickup_from: self.pickup_from,
            pickup_to: self.pickup_to,
            payment_status,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CompleteOrderRequest {
    #[serde(default)]
    pub confirm: bool,
}

// ── Form assembly ────────────────────────────────────────────────────────────

fn optional(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("pickup_date must be YYYY-MM-DD, got '{value}'")))
}

fn parse_time(value: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| AppError::BadRequest(format!("pickup_time must be HH:MM, got '{value}'")))
}

/// Replays a submitted order onto a fresh form, the way a clerk would type it.
fn fill_form(
    request: CreateOrderRequest,
    catalog: &CatalogSnapshot,
    today: NaiveDate,
) -> Result<OrderForm, AppError> {
    let mut form = OrderForm::new(today);
    form.customer_name = request.customer_name;
    form.customer_phone = request.customer_phone;
    form.notes = request.notes;
    if let Some(status) = optional(request.payment_status.as_deref()) {
        form.payment_status = status.parse()?;
    }
    form.pickup_date = match request.pickup_date.as_deref() {
        None => Some(today),
        Some(raw) => optional(Some(raw)).map(parse_date).transpose()?,
    };
    form.pickup_time = optional(request.pickup_time.as_deref())
        .map(parse_time)
        .transpose()?;

    for (index, line) in request.lines.into_iter().enumerate() {
        if index > 0 {
            form.add_line();
        }
        form.type_item_name(index, &line.item_name, catalog)
            .map_err(DomainError::from)?;
        form.set_quantity(index, line.quantity)
            .map_err(DomainError::from)?;
    }
    form.dismiss_suggestions();
    Ok(form)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Validates the order against the active catalog and stores it with its
/// lines and total in a single insert.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = OrderMutationResponse),
        (status = 400, description = "Validation failed; nothing was stored"),
        (status = 502, description = "Backend rejected or did not answer"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let today = state.today();
    let catalog = state.order_entry.load_catalog().await?;
    let mut form = fill_form(body.into_inner(), &catalog, today)?;
    let order = state.order_entry.submit(&mut form, &catalog, today).await?;
    Ok(HttpResponse::Created().json(OrderMutationResponse {
        message: format!("訂單 #{} 已建立，總金額 NT$ {}", order.id, order.total_amount),
        order: order.into(),
    }))
}

/// GET /orders
///
/// Newest first.
#[utoipa::path(
    get,
    path = "/orders",
    params(ListOrdersParams),
    responses(
        (status = 200, description = "Matching orders", body = [OrderResponse]),
        (status = 400, description = "Unknown payment status"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let orders = state
        .reports
        .list_orders(&query.filter()?, &query.search)
        .await?;
    let body: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    get,
    path = "/orders/export",
    params(ListOrdersParams),
    responses(
        (status = 200, description = "Order report workbook", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ),
    tag = "orders"
)]
pub async fn export_orders(
    state: web::Data<AppState>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let file = state
        .reports
        .export_orders(&query.filter()?, &query.search)
        .await?;
    Ok(xlsx_download(file))
}

#[utoipa::path(
    get,
    path = "/orders/{id}/export",
    params(("id" = i64, Path, description = "Order number")),
    responses(
        (status = 200, description = "Single order workbook", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn export_order(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    Ok(xlsx_download(
        state.reports.export_order(path.into_inner()).await?,
    ))
}

/// POST /orders/{id}/complete
///
/// Marks the order as picked up. Requires `{"confirm": true}`.
#[utoipa::path(
    post,
    path = "/orders/{id}/complete",
    params(("id" = i64, Path, description = "Order number")),
    request_body = CompleteOrderRequest,
    responses(
        (status = 200, description = "Order completed", body = OrderMutationResponse),
        (status = 400, description = "Confirmation missing"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn complete_order(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<CompleteOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order = state
        .reports
        .complete_order(path.into_inner(), body.confirm)
        .await?;
    Ok(HttpResponse::Ok().json(OrderMutationResponse {
        message: format!("訂單 #{} 已結單", order.id),
        order: order.into(),
    }))
}
