use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    Deposit,
}

impl PaymentStatus {
    /// Value stored in the `payment_status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Deposit => "deposit",
        }
    }

    /// Label shown to staff and written to reports.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "欠款",
            PaymentStatus::Paid => "已付",
            PaymentStatus::Deposit => "訂金",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    /// Accepts the stored value as well as the staff-facing label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "unpaid" | "欠款" => Ok(PaymentStatus::Unpaid),
            "paid" | "已付" => Ok(PaymentStatus::Paid),
            "deposit" | "訂金" => Ok(PaymentStatus::Deposit),
            other => Err(DomainError::InvalidInput(format!(
                "unknown payment status '{other}'"
            ))),
        }
    }
}

/// One (item, quantity, frozen unit price) triple of an order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl OrderLine {
    pub fn subtotal(&self) -> BigDecimal {
        &self.unit_price * &BigDecimal::from(self.quantity)
    }
}

pub fn order_total(lines: &[OrderLine]) -> BigDecimal {
    lines
        .iter()
        .fold(BigDecimal::from(0), |sum, line| sum + line.subtotal())
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_phone: String,
    pub payment_status: PaymentStatus,
    pub pickup_date: NaiveDate,
    pub pickup_time: NaiveTime,
    pub notes: String,
    pub lines: Vec<OrderLine>,
    pub total_amount: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub payment_status: PaymentStatus,
    pub pickup_date: NaiveDate,
    pub pickup_time: NaiveTime,
    pub notes: String,
    pub lines: Vec<OrderLine>,
    pub total_amount: BigDecimal,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn from_new(id: i64, order: NewOrder, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            customer_name: order.customer_name,
            customer_phone: order.customer_phone,
            payment_status: order.payment_status,
            pickup_date: order.pickup_date,
            pickup_time: order.pickup_time,
            notes: order.notes,
            lines: order.lines,
            total_amount: order.total_amount,
            is_completed: false,
            created_at,
        }
    }

    /// Human-readable line summary, e.g. `Mooncake x3; Egg tart x2`.
    pub fn item_summary(&self) -> String {
        self.lines
            .iter()
            .map(|l| format!("{} x{}", l.item_name, l.quantity))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Free-text match over customer name, phone and item summary.
    ///
    /// Name and summary compare case-insensitively; the phone is matched as typed.
    pub fn matches_search(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let lower = term.to_lowercase();
        self.customer_name.to_lowercase().contains(&lower)
            || self.customer_phone.contains(term)
            || self.item_summary().to_lowercase().contains(&lower)
    }
}

/// Criteria the remote store can evaluate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub only_incomplete: bool,
    pub pickup_from: Option<NaiveDate>,
    pub pickup_to: Option<NaiveDate>,
    pub payment_status: Option<PaymentStatus>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        if self.only_incomplete && order.is_completed {
            return false;
        }
        if self.pickup_from.is_some_and(|from| order.pickup_date < from) {
            return false;
        }
        if self.pickup_to.is_some_and(|to| order.pickup_date > to) {
            return false;
        }
        if self
            .payment_status
            .is_some_and(|status| order.payment_status != status)
        {
            return false;
        }
        true
    }
}
