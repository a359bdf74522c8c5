// Persisted history of generated alerts.
//
// Purpose
// - Keep every alert the user has been shown, newest first, across restarts.
//
// Responsibilities
// - Seed a few onboarding entries when no log has ever been stored.
// - Write the full log through after every change.
// - Publish the event list to subscribers after every change.

use crate::application::persisted::{Loaded, read_json, write_json};
use crate::core::alert_event::{AlertEvent, AlertId, display_order, now_millis};
use crate::core::ports::KeyValueStore;
use std::sync::Arc;
use tokio::sync::watch;

const MINUTE_MS: i64 = 60_000;

pub fn encode_log(events: &[AlertEvent]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(events)
}

pub fn decode_log(bytes: &[u8]) -> Result<Vec<AlertEvent>, serde_json::Error> {
    serde_json::from_slice(bytes)
}

pub fn onboarding_entries(now_ms: i64) -> Vec<AlertEvent> {
    vec![
        AlertEvent::new(
            "Welcome to InventoryApp",
            "This is your first notification!",
            now_ms - 60 * MINUTE_MS,
        ),
        AlertEvent::new(
            "InventoryApp Notifications",
            "Here you will find important notifications and alerts about your warehouses inventory levels.",
            now_ms - 59 * MINUTE_MS,
        ),
        AlertEvent::new(
            "InventoryApp Push Notifications",
            "Make sure to enable push notifications to stay updated while outside the app.",
            now_ms - 58 * MINUTE_MS,
        ),
    ]
}

pub struct NotificationLog {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    events: Vec<AlertEvent>,
    published: watch::Sender<Vec<AlertEvent>>,
    persist_failures: u64,
}

impl NotificationLog {
    pub async fn load(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let mut seeded = false;
        let events = match read_json::<Vec<AlertEvent>>(kv.as_ref(), &key).await {
            Loaded::Found(events) => events,
            Loaded::Missing => {
                seeded = true;
                onboarding_entries(now_millis())
            }
            Loaded::Corrupt(error) => {
                tracing::warn!(%error, "notification log unreadable, starting over");
                seeded = true;
                onboarding_entries(now_millis())
            }
            Loaded::Unavailable(error) => {
                tracing::warn!(%error, "notification log unavailable, starting empty");
                Vec::new()
            }
        };
        let (published, _) = watch::channel(events.clone());
        let mut log = Self {
            kv,
            key,
            events,
            published,
            persist_failures: 0,
        };
        if seeded {
            log.persist().await;
        }
        log
    }

    /// Insertion order, newest first.
    pub fn events(&self) -> &[AlertEvent] {
        &self.events
    }

    pub fn display_events(&self) -> Vec<AlertEvent> {
        display_order(&self.events)
    }

    pub fn unread_count(&self) -> usize {
        self.events.iter().filter(|e| !e.is_read).count()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<AlertEvent>> {
        self.published.subscribe()
    }

    pub fn persist_failures(&self) -> u64 {
        self.persist_failures
    }

    /// Returns false when the log could not be written through.
    pub async fn record(&mut self, event: AlertEvent) -> bool {
        self.events.insert(0, event);
        self.persist().await
    }

    pub async fn mark_read(&mut self, id: AlertId) -> bool {
        self.set_read(id, true).await
    }

    pub async fn mark_unread(&mut self, id: AlertId) -> bool {
        self.set_read(id, false).await
    }

    pub async fn delete(&mut self, id: AlertId) -> bool {
        let Some(index) = self.events.iter().position(|e| e.id == id) else {
            return false;
        };
        self.events.remove(index);
        self.persist().await;
        true
    }

    async fn set_read(&mut self, id: AlertId, read: bool) -> bool {
        match self.events.iter_mut().find(|e| e.id == id) {
            Some(event) if event.is_read != read => event.is_read = read,
            _ => return false,
        }
        self.persist().await;
        true
    }

    async fn persist(&mut self) -> bool {
        self.published.send_replace(self.events.clone());
        let written = write_json(self.kv.as_ref(), &self.key, &self.events).await;
        if !written {
            self.persist_failures += 1;
        }
        written
    }
}
