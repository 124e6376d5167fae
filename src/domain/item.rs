use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub price: BigDecimal,
    pub is_active: bool,
}

impl NewItem {
    /// Validates the name and price; the name is stored trimmed and the item
    /// starts out active.
    pub fn new(name: &str, price: BigDecimal) -> Result<Self, DomainError> {
        let name = validate_name(name)?;
        validate_price(&price)?;
        Ok(Self {
            name,
            price,
            is_active: true,
        })
    }
}

/// Partial update of a catalog entry. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub price: Option<BigDecimal>,
    pub is_active: Option<bool>,
}

impl ItemPatch {
    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.is_active.is_none()
    }

    /// Returns the patch with a trimmed name, rejecting empty patches and
    /// values that would fail item creation.
    pub fn validated(self) -> Result<Self, DomainError> {
        if self.is_empty() {
            return Err(DomainError::InvalidInput("nothing to update".to_string()));
        }
        let name = self.name.as_deref().map(validate_name).transpose()?;
        if let Some(price) = &self.price {
            validate_price(price)?;
        }
        Ok(Self { name, ..self })
    }

    pub fn apply_to(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(price) = &self.price {
            item.price = price.clone();
        }
        if let Some(is_active) = self.is_active {
            item.is_active = is_active;
        }
    }
}

pub fn validate_name(name: &str) -> Result<String, DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidInput(
            "item name must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn validate_price(price: &BigDecimal) -> Result<(), DomainError> {
    if *price < BigDecimal::from(0) {
        return Err(DomainError::InvalidInput(format!(
            "price must not be negative, got {price}"
        )));
    }
    Ok(())
}

/// Key used to compare display names: trimmed and lower-cased.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    #[test]
    fn new_item_trims_name_and_is_active() {
        let item = NewItem::new("  Mooncake ", dec("100")).expect("valid item");
        assert_eq!(item.name, "Mooncake");
        assert!(item.is_active);
    }

    #[test]
    fn new_item_rejects_blank_name() {
        let err = NewItem::new("   ", dec("10")).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn new_item_rejects_negative_price() {
        let err = NewItem::new("Tea", dec("-0.5")).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn zero_price_is_allowed() {
        assert!(NewItem::new("Water", dec("0")).is_ok());
    }

    #[test]
    fn empty_patch_is_rejected() {
        let err = ItemPatch::default().validated().unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn patch_validation_trims_name() {
        let patch = ItemPatch {
            name: Some(" Egg tart ".to_string()),
            ..ItemPatch::default()
        }
        .validated()
        .expect("valid patch");
        assert_eq!(patch.name.as_deref(), Some("Egg tart"));
    }

    #[test]
    fn patch_applies_only_present_fields() {
        let mut item = Item {
            id: Uuid::new_v4(),
            name: "Bun".to_string(),
            price: dec("30"),
            is_active: true,
        };
        ItemPatch::active(false).apply_to(&mut item);
        assert_eq!(item.name, "Bun");
        assert_eq!(item.price, dec("30"));
        assert!(!item.is_active);
    }
}
