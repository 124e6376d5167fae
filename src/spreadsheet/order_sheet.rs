use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::FixedOffset;

use super::{write_sheet, Cell};
use crate::domain::errors::DomainError;
use crate::domain::order::Order;

pub const SHEET_NAME: &str = "訂單報表";
pub const DEFAULT_ITEM_COLUMNS: usize = 5;
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;
/// Largest item column count whose header still fits in an xlsx sheet
/// (16,384 columns).
pub const MAX_ITEM_COLUMNS: usize = (16_384 - FIXED_HEADER.len()) / 2;

const FIXED_HEADER: [&str; 10] = [
    "訂單 ID",
    "訂單日期",
    "取貨日期",
    "取貨時間",
    "顧客姓名",
    "顧客電話",
    "付款狀態",
    "總金額",
    "訂單備註",
    "結單狀態",
];

/// Layout knobs for order reports.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    /// Number of `品項名稱N` / `品項數量N` column pairs; lines beyond it are not exported.
    pub item_columns: usize,
    /// Offset `訂單日期` is rendered in.
    pub utc_offset: FixedOffset,
}

impl ExportOptions {
    pub fn new(item_columns: usize, utc_offset_hours: i32) -> Result<Self, DomainError> {
        if item_columns > MAX_ITEM_COLUMNS {
            return Err(DomainError::InvalidInput(format!(
                "at most {MAX_ITEM_COLUMNS} item columns fit in a sheet, got {item_columns}"
            )));
        }
        let utc_offset = utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                DomainError::InvalidInput(format!("UTC offset out of range: {utc_offset_hours}h"))
            })?;
        Ok(Self {
            item_columns,
            utc_offset,
        })
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            item_columns: DEFAULT_ITEM_COLUMNS,
            utc_offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_HOURS * 3600)
                .expect("default report offset is within range"),
        }
    }
}

pub fn header(item_columns: usize) -> Vec<String> {
    let mut header: Vec<String> = FIXED_HEADER.iter().map(|h| h.to_string()).collect();
    for i in 1..=item_columns {
        header.push(format!("品項名稱{i}"));
        header.push(format!("品項數量{i}"));
    }
    header
}

pub fn row(order: &Order, options: &ExportOptions) -> Vec<Cell> {
    let ordered_at = order.created_at.with_timezone(&options.utc_offset);
    let mut row = vec![
        Cell::Number(order.id as f64),
        Cell::text(ordered_at.format("%Y-%m-%d %H:%M").to_string()),
        Cell::text(order.pickup_date.format("%Y-%m-%d").to_string()),
        Cell::text(order.pickup_time.format("%H:%M").to_string()),
        Cell::text(order.customer_name.as_str()),
        Cell::text(order.customer_phone.as_str()),
        Cell::text(order.payment_status.label()),
        Cell::Number(amount(&order.total_amount)),
        Cell::text(order.notes.as_str()),
        Cell::text(if order.is_completed { "已結單" } else { "未結單" }),
    ];
    for i in 0..options.item_columns {
        match order.lines.get(i) {
            Some(line) => {
                row.push(Cell::text(line.item_name.as_str()));
                row.push(Cell::Number(f64::from(line.quantity)));
            }
            None => {
                row.push(Cell::Empty);
                row.push(Cell::Empty);
            }
        }
    }
    row
}

pub fn export_orders(orders: &[Order], options: &ExportOptions) -> Result<Vec<u8>, DomainError> {
    let rows: Vec<Vec<Cell>> = orders.iter().map(|o| row(o, options)).collect();
    write_sheet(SHEET_NAME, &header(options.item_columns), &rows)
}

pub fn all_orders_filename() -> String {
    "全部訂單報表.xlsx".to_string()
}

pub fn single_order_filename(order: &Order) -> String {
    format!("訂單_{}_{}.xlsx", order.customer_name, order.id)
}

fn amount(value: &BigDecimal) -> f64 {
    value.to_f64().unwrap_or_default()
}
