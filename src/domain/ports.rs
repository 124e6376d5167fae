use async_trait::async_trait;
use uuid::Uuid;

use super::errors::DomainError;
use super::item::{Item, ItemPatch, NewItem};
use super::order::{NewOrder, Order, OrderFilter};

#[async_trait]
pub trait ItemRepository: Send + Sync + 'static {
    /// All items ordered by name ascending, optionally only the active ones.
    async fn list(&self, active_only: bool) -> Result<Vec<Item>, DomainError>;
    async fn create(&self, item: NewItem) -> Result<Item, DomainError>;
    /// Single batch insert; either every row is stored or none.
    async fn create_many(&self, items: Vec<NewItem>) -> Result<Vec<Item>, DomainError>;
    async fn update(&self, id: Uuid, patch: ItemPatch) -> Result<Item, DomainError>;
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    async fn create(&self, order: NewOrder) -> Result<Order, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Order>, DomainError>;
    /// Orders matching `filter`, newest first.
    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, DomainError>;
    /// Sets the completion flag. Completing an already completed order is not an error.
    async fn mark_completed(&self, id: i64) -> Result<Order, DomainError>;
}
