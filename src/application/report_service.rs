use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderFilter};
use crate::domain::ports::OrderRepository;
use crate::spreadsheet::order_sheet::{self, ExportOptions};
use crate::spreadsheet::SpreadsheetFile;

pub struct ReportService {
    repo: Arc<dyn OrderRepository>,
    export: ExportOptions,
}

impl ReportService {
    pub fn new(repo: Arc<dyn OrderRepository>, export: ExportOptions) -> Self {
        Self { repo, export }
    }

    /// Orders matching `filter`, newest first, narrowed by the free-text `search`.
    pub async fn list_orders(
        &self,
        filter: &OrderFilter,
        search: &str,
    ) -> Result<Vec<Order>, DomainError> {
        let orders = self.repo.list(filter).await?;
        let term = search.trim();
        Ok(orders
            .into_iter()
            .filter(|o| o.matches_search(term))
            .collect())
    }

    /// Marks an order as picked up. Completing twice is harmless.
    pub async fn complete_order(&self, id: i64, confirmed: bool) -> Result<Order, DomainError> {
        if !confirmed {
            return Err(DomainError::ConfirmationRequired(format!(
                "completing order {id} must be confirmed"
            )));
        }
        let order = self.repo.mark_completed(id).await?;
        log::info!("Order {} marked as completed", id);
        Ok(order)
    }

    pub async fn export_orders(
        &self,
        filter: &OrderFilter,
        search: &str,
    ) -> Result<SpreadsheetFile, DomainError> {
        let orders = self.list_orders(filter, search).await?;
        log::debug!("Exporting {} orders", orders.len());
        Ok(SpreadsheetFile {
            filename: order_sheet::all_orders_filename(),
            bytes: order_sheet::export_orders(&orders, &self.export)?,
        })
    }

    pub async fn export_order(&self, id: i64) -> Result<SpreadsheetFile, DomainError> {
        let order = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound)?;
        Ok(SpreadsheetFile {
            filename: order_sheet::single_order_filename(&order),
            bytes: order_sheet::export_orders(std::slice::from_ref(&order), &self.export)?,
        })
    }
}
