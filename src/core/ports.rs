// Ports define what the core needs from the outside world, without implementing it.
//
// Purpose
// - Describe the remote inventory API, the authentication endpoint, durable
//   key-value storage and platform notification delivery as traits.
//
// Boundaries
// - No concrete input or output here. Adapters implement these traits in the adapters layer.
//
// Testing guidance
// - Provide in memory implementations for tests and local development.

use crate::core::credential::{AuthRequest, Credential};
use crate::core::inventory_record::{InventoryRecord, ItemId};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transport,
    Authorization,
    Validation,
    BusinessRejection,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("invalid target")]
    InvalidTarget,

    #[error("server unreachable: {0}")]
    Unreachable(String),

    #[error("not authorized")]
    Unauthorized,

    #[error("{0}")]
    ServerRejected(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl GatewayError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GatewayError::InvalidTarget | GatewayError::Unreachable(_) => ErrorCategory::Transport,
            GatewayError::Unauthorized => ErrorCategory::Authorization,
            GatewayError::MalformedResponse(_) => ErrorCategory::Validation,
            GatewayError::ServerRejected(_) => ErrorCategory::BusinessRejection,
        }
    }
}

#[async_trait]
pub trait InventoryGateway: Send + Sync {
    async fn list_all(&self) -> Result<Vec<InventoryRecord>, GatewayError>;
    async fn create(&self, record: &InventoryRecord) -> Result<InventoryRecord, GatewayError>;
    async fn update(&self, record: &InventoryRecord) -> Result<InventoryRecord, GatewayError>;
    async fn delete(&self, id: &ItemId) -> Result<(), GatewayError>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("username already exists")]
    UsernameTaken,

    #[error("authentication service unreachable: {0}")]
    Unreachable(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// The secret inside an `AuthRequest` is already a one-way hash.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self, request: &AuthRequest) -> Result<Credential, AuthError>;
    async fn register(&self, request: &AuthRequest) -> Result<Credential, AuthError>;
}

#[derive(Debug, Error)]
pub enum KvError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError>;
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), KvError>;
    async fn delete(&self, key: &str) -> Result<(), KvError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorizationStatus {
    #[default]
    NotDetermined,
    Denied,
    Authorized,
    Provisional,
    Ephemeral,
}

impl AuthorizationStatus {
    pub fn permits_delivery(self) -> bool {
        matches!(
            self,
            AuthorizationStatus::Authorized | AuthorizationStatus::Provisional
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            AuthorizationStatus::NotDetermined => "Not Determined",
            AuthorizationStatus::Denied => "Denied",
            AuthorizationStatus::Authorized => "Authorized",
            AuthorizationStatus::Provisional => "Provisional",
            AuthorizationStatus::Ephemeral => "Ephemeral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledAlert {
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub deliver_after: Duration,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("notification delivery not authorized")]
    NotAuthorized,

    #[error("notification delivery failed: {0}")]
    Platform(String),
}

#[async_trait]
pub trait NotificationCenter: Send + Sync {
    async fn authorization_status(&self) -> AuthorizationStatus;
    /// Prompts when undetermined; otherwise reports the settled status.
    async fn request_authorization(&self) -> AuthorizationStatus;
    async fn schedule(&self, alert: ScheduledAlert) -> Result<(), DeliveryError>;
}
