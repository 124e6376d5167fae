use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::item::{Item, ItemPatch, NewItem};
use crate::domain::order::{NewOrder, Order, OrderFilter};
use crate::domain::ports::{ItemRepository, OrderRepository};

#[derive(Default)]
struct State {
    items: Vec<Item>,
    orders: Vec<Order>,
    next_order_id: i64,
    unavailable: bool,
}

/// Process-local stand-in for the hosted tables, used by the test suites.
///
/// Orders get increasing ids and strictly increasing creation times so that
/// newest-first ordering is deterministic.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every call fails the way an unreachable backend would.
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.unavailable = unavailable;
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        let state = self
            .state
            .lock()
            .map_err(|_| DomainError::Internal("store lock poisoned".to_string()))?;
        if state.unavailable {
            return Err(DomainError::Remote("backend unavailable".to_string()));
        }
        Ok(state)
    }
}

fn stored(item: NewItem) -> Item {
    Item {
        id: Uuid::new_v4(),
        name: item.name,
        price: item.price,
        is_active: item.is_active,
    }
}

#[async_trait]
impl ItemRepository for InMemoryStore {
    async fn list(&self, active_only: bool) -> Result<Vec<Item>, DomainError> {
        let state = self.state()?;
        let mut items: Vec<Item> = state
            .items
            .iter()
            .filter(|i| !active_only || i.is_active)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn create(&self, item: NewItem) -> Result<Item, DomainError> {
        let item = stored(item);
        self.state()?.items.push(item.clone());
        Ok(item)
    }

    async fn create_many(&self, items: Vec<NewItem>) -> Result<Vec<Item>, DomainError> {
        let mut state = self.state()?;
        let items: Vec<Item> = items.into_iter().map(stored).collect();
        state.items.extend(items.iter().cloned());
        Ok(items)
    }

    async fn update(&self, id: Uuid, patch: ItemPatch) -> Result<Item, DomainError> {
        let mut state = self.state()?;
        let item = state
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(DomainError::NotFound)?;
        patch.apply_to(item);
        Ok(item.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut state = self.state()?;
        let before = state.items.len();
        state.items.retain(|i| i.id != id);
        if state.items.len() == before {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let mut state = self.state()?;
        state.next_order_id += 1;
        let id = state.next_order_id;
        let created_at = Utc::now() + Duration::milliseconds(id);
        let order = Order::from_new(id, order, created_at);
        state.orders.push(order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Order>, DomainError> {
        Ok(self.state()?.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, DomainError> {
        let state = self.state()?;
        let mut orders: Vec<Order> = state
            .orders
            .iter()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn mark_completed(&self, id: i64) -> Result<Order, DomainError> {
        let mut state = self.state()?;
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(DomainError::NotFound)?;
        order.is_completed = true;
        Ok(order.clone())
    }
}
