// In-app alert entries.
//
// Purpose
// - Describe one generated alert, persisted in the notification log.
//
// Responsibilities
// - Immutable after creation except for the read flag.
// - `created_at` is epoch milliseconds.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(Uuid);

impl AlertId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl std::fmt::Display for AlertId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEvent {
    pub id: AlertId,
    pub title: String,
    pub message: String,
    pub created_at: i64,
    #[serde(default)]
    pub is_read: bool,
}

impl AlertEvent {
    pub fn new(title: impl Into<String>, message: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: AlertId::generate(),
            title: title.into(),
            message: message.into(),
            created_at,
            is_read: false,
        }
    }
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Newest first by creation time. Ties keep their relative order.
pub fn display_order(events: &[AlertEvent]) -> Vec<AlertEvent> {
    let mut sorted = events.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}
