use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::domain::catalog::CatalogSnapshot;
use crate::domain::errors::DomainError;
use crate::domain::item::Item;
use crate::domain::order::{order_total, NewOrder, OrderLine, PaymentStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("an order needs at least one line")]
    LastLine,
    #[error("line {0} does not exist")]
    NoSuchLine(usize),
    #[error("no suggestion at position {0}")]
    NoSuchSuggestion(usize),
    #[error("customer name is required")]
    MissingCustomerName,
    #[error("pickup date is required")]
    MissingPickupDate,
    #[error("pickup time is required")]
    MissingPickupTime,
    #[error("line {0} needs an item name and a quantity of at least 1")]
    IncompleteLine(usize),
    #[error("unknown items: {}", .0.join(", "))]
    UnknownItems(Vec<String>),
}

impl From<FormError> for DomainError {
    fn from(e: FormError) -> Self {
        DomainError::InvalidInput(e.to_string())
    }
}

/// A line being edited. `unit_price` is the catalog price captured when the
/// name last matched an item; `None` while the name is unresolved.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftLine {
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: Option<BigDecimal>,
}

impl DraftLine {
    fn blank() -> Self {
        Self {
            item_name: String::new(),
            quantity: 1,
            unit_price: None,
        }
    }
}

/// Where the UI should move the cursor next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Quantity(usize),
}

#[derive(Debug, Clone)]
struct Lookup {
    line: usize,
    suggestions: Vec<Item>,
}

/// In-memory state of the order entry form.
///
/// The form always holds at least one line. Header fields are plain data;
/// line edits go through methods so that captured prices and the suggestion
/// list stay consistent with what was typed.
#[derive(Debug, Clone)]
pub struct OrderForm {
    pub customer_name: String,
    pub customer_phone: String,
    pub payment_status: PaymentStatus,
    pub pickup_date: Option<NaiveDate>,
    pub pickup_time: Option<NaiveTime>,
    pub notes: String,
    lines: Vec<DraftLine>,
    lookup: Option<Lookup>,
}

impl OrderForm {
    /// Blank form: pickup defaults to `today`, payment to unpaid, one empty line.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            customer_name: String::new(),
            customer_phone: String::new(),
            payment_status: PaymentStatus::default(),
            pickup_date: Some(today),
            pickup_time: None,
            notes: String::new(),
            lines: vec![DraftLine::blank()],
            lookup: None,
        }
    }

    pub fn reset(&mut self, today: NaiveDate) {
        *self = Self::new(today);
    }

    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    /// Appends a blank line and returns its index.
    pub fn add_line(&mut self) -> usize {
        self.lines.push(DraftLine::blank());
        self.lines.len() - 1
    }

    pub fn remove_line(&mut self, index: usize) -> Result<DraftLine, FormError> {
        self.check_line(index)?;
        if self.lines.len() == 1 {
            return Err(FormError::LastLine);
        }
        let removed = self.lines.remove(index);
        match self.lookup.as_ref().map(|l| l.line) {
            Some(line) if line == index => self.lookup = None,
            Some(line) if line > index => {
                if let Some(lookup) = self.lookup.as_mut() {
                    lookup.line = line - 1;
                }
            }
            _ => {}
        }
        Ok(removed)
    }

    pub fn set_quantity(&mut self, index: usize, quantity: i32) -> Result<(), FormError> {
        self.check_line(index)?;
        self.lines[index].quantity = quantity;
        Ok(())
    }

    /// Records the name as typed, re-resolves the line price against the
    /// catalog and opens the suggestion list for the line.
    pub fn type_item_name(
        &mut self,
        index: usize,
        text: &str,
        catalog: &CatalogSnapshot,
    ) -> Result<&[Item], FormError> {
        self.check_line(index)?;
        let line = &mut self.lines[index];
        line.item_name = text.to_string();
        line.unit_price = catalog.price_of(text).cloned();
        Ok(self.open_lookup(index, catalog))
    }

    /// Reopens suggestions for the current text of a line.
    pub fn focus_item_name(
        &mut self,
        index: usize,
        catalog: &CatalogSnapshot,
    ) -> Result<&[Item], FormError> {
        self.check_line(index)?;
        Ok(self.open_lookup(index, catalog))
    }

    /// The open suggestion list, if any, with the line it belongs to.
    pub fn suggestions(&self) -> Option<(usize, &[Item])> {
        self.lookup
            .as_ref()
            .filter(|l| !l.suggestions.is_empty())
            .map(|l| (l.line, l.suggestions.as_slice()))
    }

    /// Fills the line from the chosen suggestion and closes the list.
    pub fn select_suggestion(&mut self, position: usize) -> Result<Focus, FormError> {
        let (index, item) = self
            .lookup
            .as_ref()
            .and_then(|l| Some((l.line, l.suggestions.get(position)?.clone())))
            .ok_or(FormError::NoSuchSuggestion(position))?;
        self.lookup = None;
        let line = &mut self.lines[index];
        line.item_name = item.name;
        line.unit_price = Some(item.price);
        Ok(Focus::Quantity(index))
    }

    pub fn dismiss_suggestions(&mut self) {
        self.lookup = None;
    }

    /// Running total. Lines without a captured price count as zero.
    pub fn total(&self) -> BigDecimal {
        self.lines.iter().fold(BigDecimal::from(0), |sum, line| {
            match &line.unit_price {
                Some(price) => sum + price * &BigDecimal::from(line.quantity),
                None => sum,
            }
        })
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if self.customer_name.trim().is_empty() {
            return Err(FormError::MissingCustomerName);
        }
        if self.pickup_date.is_none() {
            return Err(FormError::MissingPickupDate);
        }
        if self.pickup_time.is_none() {
            return Err(FormError::MissingPickupTime);
        }
        if let Some(pos) = self
            .lines
            .iter()
            .position(|l| l.item_name.trim().is_empty() || l.quantity < 1)
        {
            return Err(FormError::IncompleteLine(pos + 1));
        }
        Ok(())
    }

    /// Builds the record to insert. Every line must name an active item of
    /// `catalog`, which also supplies the unit price; names that resolve to
    /// nothing block the submission whatever price the line displayed.
    pub fn to_new_order(&self, catalog: &CatalogSnapshot) -> Result<NewOrder, FormError> {
        self.validate()?;
        let pickup_date = self.pickup_date.ok_or(FormError::MissingPickupDate)?;
        let pickup_time = self.pickup_time.ok_or(FormError::MissingPickupTime)?;

        let mut unknown = Vec::new();
        let mut lines = Vec::with_capacity(self.lines.len());
        for draft in &self.lines {
            match catalog.find(&draft.item_name) {
                Some(item) => lines.push(OrderLine {
                    item_name: item.name.clone(),
                    quantity: draft.quantity,
                    unit_price: item.price.clone(),
                }),
                None => unknown.push(draft.item_name.trim().to_string()),
            }
        }
        if !unknown.is_empty() {
            return Err(FormError::UnknownItems(unknown));
        }

        let total_amount = order_total(&lines);
        Ok(NewOrder {
            customer_name: self.customer_name.trim().to_string(),
            customer_phone: self.customer_phone.trim().to_string(),
            payment_status: self.payment_status,
            pickup_date,
            pickup_time,
            notes: self.notes.clone(),
            lines,
            total_amount,
        })
    }

    fn check_line(&self, index: usize) -> Result<(), FormError> {
        if index < self.lines.len() {
            Ok(())
        } else {
            Err(FormError::NoSuchLine(index))
        }
    }

    fn open_lookup(&mut self, index: usize, catalog: &CatalogSnapshot) -> &[Item] {
        let suggestions = catalog.suggest(&self.lines[index].item_name);
        &self
            .lookup
            .insert(Lookup {
                line: index,
                suggestions,
            })
            .suggestions
    }
}
