// In memory implementation of the InventoryGateway port.
//
// Purpose
// - Stand in for the remote inventory API in tests and local development.
//
// Responsibilities
// - Behave like the server: assign identities on create, trim text fields,
//   default the symbol, reject empty names and non-positive capacity.
// - List items by name ascending.
// - Simulate latency, outages and one-off failures on demand.

use crate::core::inventory_record::{DEFAULT_SYMBOL_NAME, InventoryRecord, ItemId};
use crate::core::ports::{GatewayError, InventoryGateway};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryInventoryGateway {
    rows: RwLock<HashMap<ItemId, InventoryRecord>>,
    is_offline: AtomicBool,
    delay_ms: AtomicU64,
    scripted_failures: StdMutex<VecDeque<GatewayError>>,
}

impl InMemoryInventoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<InventoryRecord>) -> Self {
        let rows = items.into_iter().map(|item| (item.id.clone(), item)).collect();
        Self {
            rows: RwLock::new(rows),
            ..Self::default()
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.is_offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_delay_ms(&self, ms: u64) {
        self.delay_ms.store(ms, Ordering::SeqCst);
    }

    /// The next call fails with `error`, whatever it is.
    pub fn fail_next(&self, error: GatewayError) {
        if let Ok(mut queue) = self.scripted_failures.lock() {
            queue.push_back(error);
        }
    }

    pub async fn server_items(&self) -> Vec<InventoryRecord> {
        let mut items: Vec<_> = self.rows.read().await.values().cloned().collect();
        sort_by_name(&mut items);
        items
    }

    async fn before_call(&self) -> Result<(), GatewayError> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.is_offline.load(Ordering::SeqCst) {
            return Err(GatewayError::Unreachable("Inventory API offline".into()));
        }
        let scripted = self
            .scripted_failures
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front());
        match scripted {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn sort_by_name(items: &mut [InventoryRecord]) {
    items.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}

fn normalize(record: &InventoryRecord) -> Result<InventoryRecord, GatewayError> {
    let name = record.name.trim().to_string();
    if name.is_empty() {
        return Err(GatewayError::ServerRejected("name cannot be empty.".into()));
    }
    if record.quantity < 0 {
        return Err(GatewayError::ServerRejected("quantity cannot be negative.".into()));
    }
    if record.capacity <= 0 {
        return Err(GatewayError::ServerRejected(
            "maxQuantity must be greater than 0.".into(),
        ));
    }
    let symbol_name = match record.symbol_name.trim() {
        "" => DEFAULT_SYMBOL_NAME.to_string(),
        symbol => symbol.to_string(),
    };
    Ok(InventoryRecord {
        id: record.id.clone(),
        name,
        quantity: record.quantity,
        capacity: record.capacity,
        location: record.location.trim().to_string(),
        symbol_name,
    })
}

#[async_trait::async_trait]
impl InventoryGateway for InMemoryInventoryGateway {
    async fn list_all(&self) -> Result<Vec<InventoryRecord>, GatewayError> {
        self.before_call().await?;
        Ok(self.server_items().await)
    }

    async fn create(&self, record: &InventoryRecord) -> Result<InventoryRecord, GatewayError> {
        self.before_call().await?;
        let mut stored = normalize(record)?;
        stored.id = ItemId::new(Uuid::now_v7().to_string());
        self.rows
            .write()
            .await
            .insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn update(&self, record: &InventoryRecord) -> Result<InventoryRecord, GatewayError> {
        self.before_call().await?;
        let stored = normalize(record)?;
        let mut guard = self.rows.write().await;
        match guard.get_mut(&stored.id) {
            Some(slot) => {
                *slot = stored.clone();
                Ok(stored)
            }
            None => Err(GatewayError::ServerRejected(format!(
                "No item found with id {}.",
                stored.id
            ))),
        }
    }

    async fn delete(&self, id: &ItemId) -> Result<(), GatewayError> {
        self.before_call().await?;
        match self.rows.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(GatewayError::ServerRejected(format!(
                "No item found with id {id}."
            ))),
        }
    }
}
