// User preference and platform permission for low-stock delivery.
//
// Responsibilities
// - Delivery needs both the in-app preference and a platform status that allows it.
// - Turning the preference on asks the platform first; a refusal leaves it off.
// - Losing platform permission switches the preference off.

use crate::application::persisted::{Loaded, read_json, write_json};
use crate::core::ports::{AuthorizationStatus, KeyValueStore, NotificationCenter};
use std::sync::Arc;

pub struct NotificationSettings {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    center: Arc<dyn NotificationCenter>,
    enabled: bool,
    status: AuthorizationStatus,
    persist_failures: u64,
}

impl NotificationSettings {
    pub async fn load(
        kv: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        center: Arc<dyn NotificationCenter>,
    ) -> Self {
        let key = key.into();
        let enabled = match read_json::<bool>(kv.as_ref(), &key).await {
            Loaded::Found(enabled) => enabled,
            Loaded::Missing => false,
            Loaded::Corrupt(error) => {
                tracing::warn!(%error, "notification preference unreadable, treating as off");
                false
            }
            Loaded::Unavailable(error) => {
                tracing::warn!(%error, "notification preference unavailable, treating as off");
                false
            }
        };
        let mut settings = Self {
            kv,
            key,
            center,
            enabled,
            status: AuthorizationStatus::NotDetermined,
            persist_failures: 0,
        };
        settings.refresh_authorization_status().await;
        settings
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn authorization_status(&self) -> AuthorizationStatus {
        self.status
    }

    pub fn status_text(&self) -> &'static str {
        self.status.label()
    }

    pub fn permits_delivery(&self) -> bool {
        self.enabled && self.status.permits_delivery()
    }

    pub fn persist_failures(&self) -> u64 {
        self.persist_failures
    }

    /// Returns the preference after the change took effect.
    pub async fn set_enabled(&mut self, on: bool) -> bool {
        if on {
            self.status = self.center.request_authorization().await;
            self.enabled = self.status.permits_delivery();
            tracing::info!(status = self.status.label(), enabled = self.enabled, "notification permission requested");
        } else {
            self.enabled = false;
        }
        self.persist().await;
        self.enabled
    }

    pub async fn refresh_authorization_status(&mut self) {
        self.status = self.center.authorization_status().await;
        if self.enabled && !self.status.permits_delivery() {
            tracing::info!(status = self.status.label(), "platform permission lost, notifications turned off");
            self.enabled = false;
            self.persist().await;
        }
    }

    async fn persist(&mut self) {
        if !write_json(self.kv.as_ref(), &self.key, &self.enabled).await {
            self.persist_failures += 1;
        }
    }
}
