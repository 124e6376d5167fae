use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::item::{Item, ItemPatch, NewItem};
use crate::domain::ports::ItemRepository;

use super::models::{ItemPatchRow, ItemRow, NewItemRow, ITEMS_TABLE, ITEM_COLUMNS};
use super::rest_client::{eq, Params, RestClient};

pub struct RestItemRepository {
    client: RestClient,
}

impl RestItemRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

fn by_id(id: Uuid) -> Params {
    vec![("id", eq(id)), ("select", ITEM_COLUMNS.to_string())]
}

#[async_trait]
impl ItemRepository for RestItemRepository {
    async fn list(&self, active_only: bool) -> Result<Vec<Item>, DomainError> {
        let mut params: Params = vec![
            ("select", ITEM_COLUMNS.to_string()),
            ("order", "name.asc".to_string()),
        ];
        if active_only {
            params.push(("is_active", eq(true)));
        }
        let rows: Vec<ItemRow> = self.client.select(ITEMS_TABLE, &params).await?;
        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn create(&self, item: NewItem) -> Result<Item, DomainError> {
        self.create_many(vec![item])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::Remote("insert returned no row".to_string()))
    }

    async fn create_many(&self, items: Vec<NewItem>) -> Result<Vec<Item>, DomainError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<NewItemRow> = items.iter().map(NewItemRow::from).collect();
        let stored: Vec<ItemRow> = self
            .client
            .insert(ITEMS_TABLE, ITEM_COLUMNS, &rows)
            .await?;
        Ok(stored.into_iter().map(Item::from).collect())
    }

    async fn update(&self, id: Uuid, patch: ItemPatch) -> Result<Item, DomainError> {
        let rows: Vec<ItemRow> = self
            .client
            .update(ITEMS_TABLE, &by_id(id), &ItemPatchRow::from(&patch))
            .await?;
        rows.into_iter()
            .next()
            .map(Item::from)
            .ok_or(DomainError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let rows: Vec<ItemRow> = self.client.delete(ITEMS_TABLE, &by_id(id)).await?;
        if rows.is_empty() {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use serde_json::json;

    use super::*;
    use crate::infrastructure::rest_client::tests::{decode, fake_backend};

    fn repo(url: &str) -> RestItemRepository {
        RestItemRepository::new(RestClient::new(url, "k").expect("client"))
    }

    #[tokio::test]
    async fn list_orders_by_name_and_filters_active() {
        let id = Uuid::new_v4();
        let (url, log) = fake_backend(
            200,
            json!([{ "id": id, "name": "Mooncake", "price": "100.00", "is_active": true }]),
        )
        .await;

        let items = repo(&url).list(true).await.expect("list");

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id);
        assert_eq!(items[0].price, BigDecimal::from(100));
        let query = decode(&log.lock().unwrap()[0].query);
        assert!(query.contains("order=name.asc"));
        assert!(query.contains("is_active=eq.true"));
        assert!(query.contains("price::text"));
    }

    #[tokio::test]
    async fn create_many_is_one_batch_request() {
        let (url, log) = fake_backend(
            201,
            json!([
                { "id": Uuid::new_v4(), "name": "A", "price": "1", "is_active": true },
                { "id": Uuid::new_v4(), "name": "B", "price": "2", "is_active": true }
            ]),
        )
        .await;
        let items = vec![
            NewItem::new("A", BigDecimal::from_str("1").unwrap()).unwrap(),
            NewItem::new("B", BigDecimal::from_str("2").unwrap()).unwrap(),
        ];

        let stored = repo(&url).create_many(items).await.expect("insert");

        assert_eq!(stored.len(), 2);
        let log = log.lock().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].body.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found() {
        let (url, log) = fake_backend(200, json!([])).await;
        let id = Uuid::new_v4();

        let err = repo(&url)
            .update(id, ItemPatch::active(false))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound));
        let seen = log.lock().unwrap()[0].clone();
        assert_eq!(seen.method, "PATCH");
        assert!(decode(&seen.query).contains(&format!("id=eq.{id}")));
        assert_eq!(seen.body, json!({ "is_active": false }));
    }

    #[tokio::test]
    async fn delete_of_missing_row_is_not_found() {
        let (url, _log) = fake_backend(200, json!([])).await;
        let err = repo(&url).delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
    }
}
