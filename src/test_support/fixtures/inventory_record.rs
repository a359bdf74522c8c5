// Shared test fixture for InventoryRecord.
// The baseline record lives in json/inventory_record.json in the wire shape
// the inventory API returns.

use crate::core::inventory_record::{InventoryRecord, ItemId};

const FIXTURE: &str = include_str!("json/inventory_record.json");

pub struct InventoryRecordBuilder {
    inner: InventoryRecord,
}

impl Default for InventoryRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl InventoryRecordBuilder {
    pub fn new() -> Self {
        let inner: InventoryRecord = serde_json::from_str(FIXTURE).unwrap();
        Self { inner }
    }

    pub fn id(mut self, v: impl Into<String>) -> Self {
        self.inner.id = ItemId::new(v);
        self
    }

    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.inner.name = v.into();
        self
    }

    pub fn quantity(mut self, v: i64) -> Self {
        self.inner.quantity = v;
        self
    }

    pub fn capacity(mut self, v: i64) -> Self {
        self.inner.capacity = v;
        self
    }

    pub fn location(mut self, v: impl Into<String>) -> Self {
        self.inner.location = v.into();
        self
    }

    pub fn symbol_name(mut self, v: impl Into<String>) -> Self {
        self.inner.symbol_name = v.into();
        self
    }

    pub fn build(self) -> InventoryRecord {
        self.inner
    }
}
