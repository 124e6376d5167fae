use async_trait::async_trait;

use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderFilter};
use crate::domain::ports::OrderRepository;

use super::models::{CompletionPatch, NewOrderRow, OrderRow, ORDERS_TABLE, ORDER_COLUMNS};
use super::rest_client::{eq, Params, RestClient};

// ── Repository ────────────────────────────────────────────────────────────────

pub struct RestOrderRepository {
    client: RestClient,
}

impl RestOrderRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

/// Translates the filter into PostgREST query parameters, newest first.
pub fn filter_params(filter: &OrderFilter) -> Params {
    let mut params: Params = vec![
        ("select", ORDER_COLUMNS.to_string()),
        ("order", "created_at.desc".to_string()),
    ];
    if filter.only_incomplete {
        params.push(("is_completed", eq(false)));
    }
    if let Some(from) = filter.pickup_from {
        params.push(("pickup_date", format!("gte.{from}")));
    }
    if let Some(to) = filter.pickup_to {
        params.push(("pickup_date", format!("lte.{to}")));
    }
    if let Some(status) = filter.payment_status {
        params.push(("payment_status", eq(status.as_str())));
    }
    params
}

fn by_id(id: i64) -> Params {
    vec![("id", eq(id)), ("select", ORDER_COLUMNS.to_string())]
}

fn into_orders(rows: Vec<OrderRow>) -> Result<Vec<Order>, DomainError> {
    rows.into_iter().map(Order::try_from).collect()
}

#[async_trait]
impl OrderRepository for RestOrderRepository {
    async fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let rows: Vec<OrderRow> = self
            .client
            .insert(ORDERS_TABLE, ORDER_COLUMNS, &[NewOrderRow::from(&order)])
            .await?;
        into_orders(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::Remote("insert returned no row".to_string()))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Order>, DomainError> {
        let rows: Vec<OrderRow> = self.client.select(ORDERS_TABLE, &by_id(id)).await?;
        Ok(into_orders(rows)?.into_iter().next())
    }

    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, DomainError> {
        let rows: Vec<OrderRow> = self
            .client
            .select(ORDERS_TABLE, &filter_params(filter))
            .await?;
        into_orders(rows)
    }

    async fn mark_completed(&self, id: i64) -> Result<Order, DomainError> {
        let rows: Vec<OrderRow> = self
            .client
            .update(
                ORDERS_TABLE,
                &by_id(id),
                &CompletionPatch { is_completed: true },
            )
            .await?;
        into_orders(rows)?
            .into_iter()
            .next()
            .ok_or(DomainError::NotFound)
    }
}
