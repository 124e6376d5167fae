use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::item::{Item, ItemPatch, NewItem};
use crate::domain::order::{NewOrder, Order, OrderLine};

pub const ITEMS_TABLE: &str = "items";
pub const ORDERS_TABLE: &str = "orders";

/// Numeric columns are cast to text so prices arrive as exact decimals.
pub const ITEM_COLUMNS: &str = "id,name,price::text,is_active";
pub const ORDER_COLUMNS: &str = "id,customer_name,customer_phone,payment_status,pickup_date,\
pickup_time,notes,lines,total_amount::text,is_completed,created_at";

#[derive(Debug, Clone, Deserialize)]
pub struct ItemRow {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub is_active: bool,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            name: row.name,
            price: row.price,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NewItemRow<'a> {
    pub name: &'a str,
    pub price: &'a BigDecimal,
    pub is_active: bool,
}

impl<'a> From<&'a NewItem> for NewItemRow<'a> {
    fn from(item: &'a NewItem) -> Self {
        NewItemRow {
            name: &item.name,
            price: &item.price,
            is_active: item.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItemPatchRow<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<&'a BigDecimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl<'a> From<&'a ItemPatch> for ItemPatchRow<'a> {
    fn from(patch: &'a ItemPatch) -> Self {
        ItemPatchRow {
            name: patch.name.as_deref(),
            price: patch.price.as_ref(),
            is_active: patch.is_active,
        }
    }
}

/// Embedded element of the `lines` jsonb column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineRow {
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl From<&OrderLine> for OrderLineRow {
    fn from(line: &OrderLine) -> Self {
        OrderLineRow {
            item_name: line.item_name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price.clone(),
        }
    }
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        OrderLine {
            item_name: row.item_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderRow {
    pub id: i64,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub payment_status: String,
    pub pickup_date: NaiveDate,
    pub pickup_time: NaiveTime,
    pub notes: Option<String>,
    #[serde(default)]
    pub lines: Vec<OrderLineRow>,
    pub total_amount: BigDecimal,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: row.id,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone.unwrap_or_default(),
            payment_status: row.payment_status.parse()?,
            pickup_date: row.pickup_date,
            pickup_time: row.pickup_time,
            notes: row.notes.unwrap_or_default(),
            lines: row.lines.into_iter().map(OrderLine::from).collect(),
            total_amount: row.total_amount,
            is_completed: row.is_completed,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct NewOrderRow<'a> {
    pub customer_name: &'a str,
    pub customer_phone: &'a str,
    pub payment_status: &'static str,
    pub pickup_date: NaiveDate,
    pub pickup_time: NaiveTime,
    pub notes: &'a str,
    pub lines: Vec<OrderLineRow>,
    pub total_amount: &'a BigDecimal,
    pub is_completed: bool,
}

impl<'a> From<&'a NewOrder> for NewOrderRow<'a> {
    fn from(order: &'a NewOrder) -> Self {
        NewOrderRow {
            customer_name: &order.customer_name,
            customer_phone: &order.customer_phone,
            payment_status: order.payment_status.as_str(),
            pickup_date: order.pickup_date,
            pickup_time: order.pickup_time,
            notes: &order.notes,
            lines: order.lines.iter().map(OrderLineRow::from).collect(),
            total_amount: &order.total_amount,
            is_completed: false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompletionPatch {
    pub is_completed: bool,
}
