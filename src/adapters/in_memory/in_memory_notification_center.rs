// In memory implementation of the NotificationCenter port.
//
// Purpose
// - Record scheduled alerts so tests can assert on platform delivery.
//
// Responsibilities
// - Answer authorization requests the way the platform does: an undetermined
//   status resolves to whatever the simulated user grants.

use crate::core::ports::{AuthorizationStatus, DeliveryError, NotificationCenter, ScheduledAlert};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

pub struct InMemoryNotificationCenter {
    status: RwLock<AuthorizationStatus>,
    grant_on_request: bool,
    is_failing: AtomicBool,
    scheduled: RwLock<Vec<ScheduledAlert>>,
}

impl InMemoryNotificationCenter {
    pub fn new(status: AuthorizationStatus) -> Self {
        Self {
            status: RwLock::new(status),
            grant_on_request: true,
            is_failing: AtomicBool::new(false),
            scheduled: RwLock::new(Vec::new()),
        }
    }

    /// A user who answers "Don't Allow" to the permission prompt.
    pub fn denying() -> Self {
        Self {
            grant_on_request: false,
            ..Self::new(AuthorizationStatus::NotDetermined)
        }
    }

    pub async fn set_status(&self, status: AuthorizationStatus) {
        *self.status.write().await = status;
    }

    pub fn set_failing(&self, failing: bool) {
        self.is_failing.store(failing, Ordering::SeqCst);
    }

    pub async fn scheduled(&self) -> Vec<ScheduledAlert> {
        self.scheduled.read().await.clone()
    }
}

#[async_trait::async_trait]
impl NotificationCenter for InMemoryNotificationCenter {
    async fn authorization_status(&self) -> AuthorizationStatus {
        *self.status.read().await
    }

    async fn request_authorization(&self) -> AuthorizationStatus {
        let mut status = self.status.write().await;
        if *status == AuthorizationStatus::NotDetermined {
            *status = if self.grant_on_request {
                AuthorizationStatus::Authorized
            } else {
                AuthorizationStatus::Denied
            };
        }
        *status
    }

    async fn schedule(&self, alert: ScheduledAlert) -> Result<(), DeliveryError> {
        if self.is_failing.load(Ordering::SeqCst) {
            return Err(DeliveryError::Platform("Notification center offline".into()));
        }
        if !self.status.read().await.permits_delivery() {
            return Err(DeliveryError::NotAuthorized);
        }
        self.scheduled.write().await.push(alert);
        Ok(())
    }
}
