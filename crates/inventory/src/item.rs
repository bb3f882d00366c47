use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cargodesk_core::patch::double_option;
use cargodesk_core::{validate, DomainError, DomainResult, FieldValue, Record};
use cargodesk_parties::ClientId;

cargodesk_core::record_id!(
    /// Inventory item identifier.
    InventoryItemId,
    "InventoryItemId"
);

const DEFAULT_UNIT: &str = "unit";

/// A stock-keeping unit held in the warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub unit: String,
    pub location: Option<String>,
    /// Owner of the goods, when stored on behalf of a client.
    pub client_id: Option<ClientId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInventoryItem {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    pub unit: Option<String>,
    pub location: Option<String>,
    pub client_id: Option<ClientId>,
}

/// Partial update. Quantity is only changed through [`InventoryItem::adjust`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItemPatch {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub location: Option<String>,
    #[serde(default, with = "double_option")]
    pub client_id: Option<Option<ClientId>>,
}

impl InventoryItem {
    pub fn create(id: InventoryItemId, input: NewInventoryItem, now: DateTime<Utc>) -> DomainResult<Self> {
        if input.quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        Ok(Self {
            id,
            sku: validate::required("sku", &input.sku)?.to_ascii_uppercase(),
            name: validate::required("name", &input.name)?,
            description: validate::optional_trimmed(input.description.as_deref()),
            quantity: input.quantity,
            unit: validate::optional_trimmed(input.unit.as_deref())
                .unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            location: validate::optional_trimmed(input.location.as_deref()),
            client_id: input.client_id,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_patch(&mut self, patch: InventoryItemPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        if let Some(v) = patch.sku.as_deref() {
            next.sku = validate::required("sku", v)?.to_ascii_uppercase();
        }
        if let Some(v) = patch.name.as_deref() {
            next.name = validate::required("name", v)?;
        }
        if let Some(v) = patch.description.as_deref() {
            next.description = validate::optional_trimmed(Some(v));
        }
        if let Some(v) = patch.unit.as_deref() {
            next.unit = validate::required("unit", v)?;
        }
        if let Some(v) = patch.location.as_deref() {
            next.location = validate::optional_trimmed(Some(v));
        }
        if let Some(client_id) = patch.client_id {
            next.client_id = client_id;
        }
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    /// Apply a stock movement (positive = received, negative = shipped out).
    pub fn adjust(&mut self, delta: i64, now: DateTime<Utc>) -> DomainResult<i64> {
        if delta == 0 {
            return Err(DomainError::validation("delta cannot be zero"));
        }

        let new_quantity = self
            .quantity
            .checked_add(delta)
            .ok_or_else(|| DomainError::invariant("stock quantity overflow"))?;
        if new_quantity < 0 {
            return Err(DomainError::invariant("stock cannot go negative"));
        }

        self.quantity = new_quantity;
        self.updated_at = now;
        Ok(new_quantity)
    }
}

impl Record for InventoryItem {
    type Id = InventoryItemId;
    const KIND: &'static str = "inventory_item";

    fn id(&self) -> InventoryItemId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(FieldValue::Id(self.id.into())),
            "sku" => Some(FieldValue::Text(self.sku.clone())),
            "client_id" => self.client_id.map(|v| FieldValue::Id(v.into())),
            _ => None,
        }
    }

    fn unique_fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![("sku", FieldValue::Text(self.sku.clone()))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn item(quantity: i64) -> InventoryItem {
        InventoryItem::create(
            InventoryItemId::new(),
            NewInventoryItem {
                sku: "box-l".to_string(),
                name: "Large shipping box".to_string(),
                quantity,
                ..NewInventoryItem::default()
            },
            test_time(),
        )
        .unwrap()
    }

    #[test]
    fn create_normalizes_sku_and_defaults_unit() {
        let i = item(5);
        assert_eq!(i.sku, "BOX-L");
        assert_eq!(i.unit, "unit");
    }

    #[test]
    fn create_rejects_negative_quantity() {
        let err = InventoryItem::create(
            InventoryItemId::new(),
            NewInventoryItem {
                sku: "x".to_string(),
                name: "x".to_string(),
                quantity: -1,
                ..NewInventoryItem::default()
            },
            test_time(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn adjust_rejects_zero_delta() {
        let mut i = item(3);
        assert!(matches!(i.adjust(0, test_time()), Err(DomainError::Validation(_))));
    }

    #[test]
    fn adjust_rejects_going_negative() {
        let mut i = item(3);
        assert!(matches!(
            i.adjust(-4, test_time()),
            Err(DomainError::InvariantViolation(_))
        ));
        assert_eq!(i.quantity, 3);
    }

    #[test]
    fn adjust_returns_new_quantity() {
        let mut i = item(3);
        assert_eq!(i.adjust(7, test_time()).unwrap(), 10);
        assert_eq!(i.adjust(-10, test_time()).unwrap(), 0);
    }

    proptest! {
        #[test]
        fn stock_never_goes_negative(deltas in proptest::collection::vec(-50i64..50, 0..40)) {
            let mut i = item(0);
            for d in deltas {
                let _ = i.adjust(d, test_time());
                prop_assert!(i.quantity >= 0);
            }
        }
    }
}
