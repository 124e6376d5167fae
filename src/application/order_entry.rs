use std::sync::Arc;

use chrono::NaiveDate;

use super::order_form::OrderForm;
use crate::domain::catalog::CatalogSnapshot;
use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::ports::{ItemRepository, OrderRepository};

pub struct OrderEntryService {
    items: Arc<dyn ItemRepository>,
    orders: Arc<dyn OrderRepository>,
    suggestion_limit: usize,
}

impl OrderEntryService {
    pub fn new(
        items: Arc<dyn ItemRepository>,
        orders: Arc<dyn OrderRepository>,
        suggestion_limit: usize,
    ) -> Self {
        Self {
            items,
            orders,
            suggestion_limit,
        }
    }

    /// Active items as of now. The snapshot is not refreshed afterwards.
    pub async fn load_catalog(&self) -> Result<CatalogSnapshot, DomainError> {
        let items = self.items.list(true).await?;
        log::debug!("Loaded {} active items for order entry", items.len());
        Ok(CatalogSnapshot::new(items, self.suggestion_limit))
    }

    /// Validates the form and stores it as one order.
    ///
    /// The form is reset to a blank state only after the insert succeeded;
    /// on any failure it keeps everything that was entered.
    pub async fn submit(
        &self,
        form: &mut OrderForm,
        catalog: &CatalogSnapshot,
        today: NaiveDate,
    ) -> Result<Order, DomainError> {
        let new_order = form.to_new_order(catalog)?;
        let order = self.orders.create(new_order).await.map_err(|e| {
            log::warn!("Order submission failed: {}", e);
            e
        })?;
        log::info!(
            "Stored order {} for '{}' totalling {}",
            order.id,
            order.customer_name,
            order.total_amount
        );
        form.reset(today);
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use chrono::NaiveTime;

    use super::*;
    use crate::domain::item::NewItem;
    use crate::domain::order::OrderFilter;
    use crate::infrastructure::memory::InMemoryStore;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 20).unwrap()
    }

    async fn setup() -> (OrderEntryService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        ItemRepository::create(
            store.as_ref(),
            NewItem::new("Mooncake", BigDecimal::from(100)).unwrap(),
        )
        .await
        .unwrap();
        let mut retired = NewItem::new("Old Cookie", BigDecimal::from(5)).unwrap();
        retired.is_active = false;
        ItemRepository::create(store.as_ref(), retired).await.unwrap();
        (OrderEntryService::new(store.clone(), store.clone(), 10), store)
    }

    fn filled_form(catalog: &CatalogSnapshot) -> OrderForm {
        let mut form = OrderForm::new(today());
        form.customer_name = "Lin".to_string();
        form.pickup_time = NaiveTime::from_hms_opt(10, 0, 0);
        form.type_item_name(0, "moon", catalog).unwrap();
        form.select_suggestion(0).unwrap();
        form.set_quantity(0, 3).unwrap();
        form
    }

    #[tokio::test]
    async fn catalog_snapshot_holds_only_active_items() {
        let (svc, _) = setup().await;
        let catalog = svc.load_catalog().await.unwrap();
        assert_eq!(catalog.items().len(), 1);
        assert!(catalog.find("Old Cookie").is_none());
    }

    #[tokio::test]
    async fn mooncake_order_totals_300_and_resets_form() {
        let (svc, store) = setup().await;
        let catalog = svc.load_catalog().await.unwrap();
        let mut form = filled_form(&catalog);
        assert_eq!(form.total(), BigDecimal::from(300));

        let order = svc.submit(&mut form, &catalog, today()).await.unwrap();

        assert_eq!(order.total_amount, BigDecimal::from(300));
        assert!(!order.is_completed);
        assert!(form.customer_name.is_empty());
        assert_eq!(form.lines().len(), 1);

        let stored = OrderRepository::list(store.as_ref(), &OrderFilter::default())
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].total_amount, BigDecimal::from(300));
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected_without_a_write() {
        let (svc, store) = setup().await;
        let catalog = svc.load_catalog().await.unwrap();
        let mut form = filled_form(&catalog);
        form.set_quantity(0, 0).unwrap();

        let err = svc.submit(&mut form, &catalog, today()).await.unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput(_)));
        let stored = OrderRepository::list(store.as_ref(), &OrderFilter::default())
            .await
            .unwrap();
        assert!(stored.is_empty());
        assert_eq!(form.customer_name, "Lin");
    }

    #[tokio::test]
    async fn remote_failure_keeps_form_data() {
        let (svc, store) = setup().await;
        let catalog = svc.load_catalog().await.unwrap();
        let mut form = filled_form(&catalog);
        store.set_unavailable(true);

        let err = svc.submit(&mut form, &catalog, today()).await.unwrap_err();

        assert!(matches!(err, DomainError::Remote(_)));
        assert_eq!(form.customer_name, "Lin");
        assert_eq!(form.lines()[0].quantity, 3);
        assert_eq!(form.total(), BigDecimal::from(300));
    }

    #[tokio::test]
    async fn inactive_item_blocks_submission() {
        let (svc, _) = setup().await;
        let catalog = svc.load_catalog().await.unwrap();
        let mut form = filled_form(&catalog);
        form.type_item_name(0, "Old Cookie", &catalog).unwrap();

        let err = svc.submit(&mut form, &catalog, today()).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(msg) if msg.contains("Old Cookie")));
    }
}
