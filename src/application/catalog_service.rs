use std::collections::HashSet;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::item::{name_key, Item, ItemPatch, NewItem};
use crate::domain::ports::ItemRepository;
use crate::spreadsheet::{item_sheet, SpreadsheetFile};

#[derive(Debug, Clone, Default)]
pub struct ItemQuery {
    /// Case-insensitive substring of the item name.
    pub name_contains: Option<String>,
    pub active_only: bool,
}

/// Outcome of a catalog upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ImportReport {
    pub inserted: usize,
    /// Rows with an empty name or an unusable price.
    pub skipped_invalid: usize,
    /// Rows naming an item that already exists or appeared earlier in the file.
    pub skipped_existing: usize,
}

pub struct CatalogService {
    repo: Arc<dyn ItemRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn ItemRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_items(&self, query: &ItemQuery) -> Result<Vec<Item>, DomainError> {
        let items = self.repo.list(query.active_only).await?;
        let needle = query
            .name_contains
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let Some(needle) = needle else {
            return Ok(items);
        };
        Ok(items
            .into_iter()
            .filter(|i| i.name.to_lowercase().contains(&needle))
            .collect())
    }

    pub async fn create_item(&self, name: &str, price: BigDecimal) -> Result<Item, DomainError> {
        let item = self.repo.create(NewItem::new(name, price)?).await?;
        log::info!("Created item '{}' ({}) at {}", item.name, item.id, item.price);
        Ok(item)
    }

    pub async fn update_item(&self, id: Uuid, patch: ItemPatch) -> Result<Item, DomainError> {
        let item = self.repo.update(id, patch.validated()?).await?;
        log::info!("Updated item {}", id);
        Ok(item)
    }

    pub async fn set_active(&self, id: Uuid, active: bool) -> Result<Item, DomainError> {
        let item = self.repo.update(id, ItemPatch::active(active)).await?;
        log::info!("Item {} is now {}", id, if active { "active" } else { "inactive" });
        Ok(item)
    }

    /// Permanently removes an item. Refused unless `confirmed`.
    pub async fn delete_item(&self, id: Uuid, confirmed: bool) -> Result<(), DomainError> {
        if !confirmed {
            return Err(DomainError::ConfirmationRequired(
                "deleting an item cannot be undone".to_string(),
            ));
        }
        self.repo.delete(id).await?;
        log::info!("Deleted item {}", id);
        Ok(())
    }

    pub async fn export_items(&self) -> Result<SpreadsheetFile, DomainError> {
        let items = self.repo.list(false).await?;
        Ok(SpreadsheetFile {
            filename: item_sheet::export_filename(),
            bytes: item_sheet::export_items(&items)?,
        })
    }

    /// Inserts the new rows of an uploaded catalog in a single batch.
    pub async fn import_items(&self, bytes: &[u8]) -> Result<ImportReport, DomainError> {
        let parsed = item_sheet::parse_items(bytes)?;
        let mut known: HashSet<String> = self
            .repo
            .list(false)
            .await?
            .iter()
            .map(|i| name_key(&i.name))
            .collect();

        let mut report = ImportReport {
            skipped_invalid: parsed.invalid,
            ..ImportReport::default()
        };
        let mut fresh = Vec::new();
        for row in parsed.rows {
            if known.insert(name_key(&row.name)) {
                fresh.push(row);
            } else {
                report.skipped_existing += 1;
            }
        }

        report.inserted = self.repo.create_many(fresh).await?.len();
        log::info!(
            "Imported {} items ({} invalid, {} already present)",
            report.inserted,
            report.skipped_invalid,
            report.skipped_existing
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::infrastructure::memory::InMemoryStore;
    use crate::spreadsheet::{write_sheet, Cell};

    fn service() -> (CatalogService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (CatalogService::new(store.clone()), store)
    }

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn created_item_is_listed_once_and_active() {
        let (svc, _) = service();
        let created = svc.create_item("  Mooncake ", dec("100")).await.unwrap();

        let items = svc.list_items(&ItemQuery::default()).await.unwrap();
        let matching: Vec<&Item> = items.iter().filter(|i| i.id == created.id).collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].name, "Mooncake");
        assert_eq!(matching[0].price, dec("100"));
        assert!(matching[0].is_active);
    }

    #[tokio::test]
    async fn invalid_item_never_reaches_the_store() {
        let (svc, store) = service();
        store.set_unavailable(true);
        let err = svc.create_item("", dec("1")).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        let err = svc.create_item("Tea", dec("-1")).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn list_filters_by_name_and_activity() {
        let (svc, _) = service();
        svc.create_item("Egg Tart", dec("35")).await.unwrap();
        let bun = svc.create_item("Red Bean Bun", dec("25")).await.unwrap();
        svc.create_item("Green Tea", dec("40")).await.unwrap();
        svc.set_active(bun.id, false).await.unwrap();

        let query = ItemQuery {
            name_contains: Some("TEA".to_string()),
            active_only: false,
        };
        let names: Vec<String> = svc
            .list_items(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Green Tea"]);

        let active = svc
            .list_items(&ItemQuery {
                name_contains: None,
                active_only: true,
            })
            .await
            .unwrap();
        assert_eq!(active.len(), 2);
    }

    #[tokio::test]
    async fn empty_patch_is_rejected() {
        let (svc, _) = service();
        let item = svc.create_item("Tea", dec("40")).await.unwrap();
        let err = svc.update_item(item.id, ItemPatch::default()).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn update_of_unknown_item_is_not_found() {
        let (svc, _) = service();
        let patch = ItemPatch {
            price: Some(dec("10")),
            ..ItemPatch::default()
        };
        let err = svc.update_item(Uuid::new_v4(), patch).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let (svc, _) = service();
        let item = svc.create_item("Tea", dec("40")).await.unwrap();

        let err = svc.delete_item(item.id, false).await.unwrap_err();
        assert!(matches!(err, DomainError::ConfirmationRequired(_)));
        assert_eq!(svc.list_items(&ItemQuery::default()).await.unwrap().len(), 1);

        svc.delete_item(item.id, true).await.unwrap();
        assert!(svc.list_items(&ItemQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_listing_surfaces_remote_error() {
        let (svc, store) = service();
        store.set_unavailable(true);
        let err = svc.list_items(&ItemQuery::default()).await.unwrap_err();
        assert!(matches!(err, DomainError::Remote(_)));
    }

    #[tokio::test]
    async fn import_skips_invalid_and_duplicate_rows() {
        let (svc, _) = service();
        svc.create_item("Mooncake", dec("100")).await.unwrap();

        let header: Vec<String> = [item_sheet::NAME_HEADER, item_sheet::PRICE_HEADER]
            .iter()
            .map(|h| h.to_string())
            .collect();
        let rows = vec![
            vec![Cell::text("mooncake "), Cell::Number(120.0)],
            vec![Cell::text("Egg Tart"), Cell::Number(35.0)],
            vec![Cell::text("EGG TART"), Cell::Number(36.0)],
            vec![Cell::text(""), Cell::Number(1.0)],
            vec![Cell::text("Tea"), Cell::text("free")],
            vec![Cell::text("Bun"), Cell::Number(25.0)],
        ];
        let bytes = write_sheet("upload", &header, &rows).unwrap();

        let report = svc.import_items(&bytes).await.unwrap();

        assert_eq!(
            report,
            ImportReport {
                inserted: 2,
                skipped_invalid: 2,
                skipped_existing: 2,
            }
        );
        let names: Vec<String> = svc
            .list_items(&ItemQuery::default())
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Bun", "Egg Tart", "Mooncake"]);
    }

    #[tokio::test]
    async fn export_then_import_inserts_nothing_new() {
        let (svc, _) = service();
        svc.create_item("Mooncake", dec("100")).await.unwrap();
        let file = svc.export_items().await.unwrap();
        assert_eq!(file.filename, "品項主檔.xlsx");

        let report = svc.import_items(&file.bytes).await.unwrap();
        assert_eq!(report.inserted, 0);
        assert_eq!(report.skipped_existing, 1);
    }

    #[tokio::test]
    async fn garbage_upload_is_rejected() {
        let (svc, _) = service();
        let err = svc.import_items(b"not a workbook").await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }
}
