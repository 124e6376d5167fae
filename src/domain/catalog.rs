use bigdecimal::BigDecimal;

use super::item::{name_key, Item};

pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// The active items loaded once when an order form is opened.
///
/// The snapshot is never refreshed behind the form's back: catalog edits made
/// elsewhere only show up in a new snapshot.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    items: Vec<Item>,
    suggestion_limit: usize,
}

impl CatalogSnapshot {
    /// Keeps only active items; inactive ones can never be picked for new orders.
    pub fn new(items: Vec<Item>, suggestion_limit: usize) -> Self {
        Self {
            items: items.into_iter().filter(|i| i.is_active).collect(),
            suggestion_limit: suggestion_limit.max(1),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn suggestion_limit(&self) -> usize {
        self.suggestion_limit
    }

    /// Case-insensitive substring lookup, capped at the suggestion limit.
    /// An empty term yields no suggestions.
    pub fn suggest(&self, term: &str) -> Vec<Item> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.items
            .iter()
            .filter(|i| i.name.to_lowercase().contains(&needle))
            .take(self.suggestion_limit)
            .cloned()
            .collect()
    }

    /// Item whose display name matches `name` exactly (ignoring case and
    /// surrounding whitespace).
    pub fn find(&self, name: &str) -> Option<&Item> {
        let key = name_key(name);
        if key.is_empty() {
            return None;
        }
        self.items.iter().find(|i| name_key(&i.name) == key)
    }

    pub fn price_of(&self, name: &str) -> Option<&BigDecimal> {
        self.find(name).map(|i| &i.price)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use uuid::Uuid;

    use super::*;

    fn item(name: &str, price: &str, is_active: bool) -> Item {
        Item {
            id: Uuid::new_v4(),
            name: name.to_string(),
            price: BigDecimal::from_str(price).expect("valid decimal"),
            is_active,
        }
    }

    fn snapshot(limit: usize) -> CatalogSnapshot {
        CatalogSnapshot::new(
            vec![
                item("Lotus Mooncake", "120", true),
                item("Red Bean Mooncake", "100", true),
                item("Mooncake Gift Box", "880", false),
                item("Egg Tart", "35", true),
            ],
            limit,
        )
    }

    #[test]
    fn inactive_items_are_excluded() {
        let catalog = snapshot(10);
        assert_eq!(catalog.items().len(), 3);
        assert!(catalog.find("Mooncake Gift Box").is_none());
    }

    #[test]
    fn suggest_is_case_insensitive_substring() {
        let names: Vec<String> = snapshot(10)
            .suggest("mooncake")
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Lotus Mooncake", "Red Bean Mooncake"]);
    }

    #[test]
    fn suggest_respects_limit() {
        assert_eq!(snapshot(1).suggest("MOON").len(), 1);
    }

    #[test]
    fn blank_term_suggests_nothing() {
        assert!(snapshot(10).suggest("  ").is_empty());
    }

    #[test]
    fn price_lookup_needs_full_name() {
        let catalog = snapshot(10);
        assert_eq!(
            catalog.price_of("egg tart"),
            Some(&BigDecimal::from_str("35").unwrap())
        );
        assert_eq!(catalog.price_of("Egg"), None);
    }
}
