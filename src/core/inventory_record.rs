// Inventory records as the client sees them.
//
// Purpose
// - Carry one warehouse item in the same shape the inventory API speaks.
//
// Responsibilities
// - Identity is opaque and the sole key for equality lookups in a collection.
// - Quantity may exceed capacity. That is not an error.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const DEFAULT_SYMBOL_NAME: &str = "shippingbox";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Client-side identity for a record the server has not confirmed yet.
    pub fn provisional() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub id: ItemId,
    pub name: String,
    pub quantity: i64,
    #[serde(rename = "maxQuantity")]
    pub capacity: i64,
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_symbol_name")]
    pub symbol_name: String,
}

fn default_symbol_name() -> String {
    DEFAULT_SYMBOL_NAME.to_string()
}

/// Fields the user fills in before an item exists anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub quantity: i64,
    pub capacity: i64,
    pub location: String,
    pub symbol_name: Option<String>,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, quantity: i64, capacity: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
            capacity,
            location: String::new(),
            symbol_name: None,
        }
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn symbol_name(mut self, symbol_name: impl Into<String>) -> Self {
        self.symbol_name = Some(symbol_name.into());
        self
    }

    pub fn into_provisional(self) -> InventoryRecord {
        InventoryRecord {
            id: ItemId::provisional(),
            name: self.name,
            quantity: self.quantity,
            capacity: self.capacity,
            location: self.location,
            symbol_name: self.symbol_name.unwrap_or_else(default_symbol_name),
        }
    }
}
