// Shared helpers for the integration tests.
#![allow(dead_code)]

use inventory_sync::core::inventory_record::{InventoryRecord, ItemId};

pub fn item(id: &str, name: &str, quantity: i64) -> InventoryRecord {
    InventoryRecord {
        id: ItemId::new(id),
        name: name.to_string(),
        quantity,
        capacity: 100,
        location: "Bay 4".to_string(),
        symbol_name: "shippingbox".to_string(),
    }
}

pub fn by_id(mut items: Vec<InventoryRecord>) -> Vec<InventoryRecord> {
    items.sort_by(|a, b| a.id.cmp(&b.id));
    items
}
