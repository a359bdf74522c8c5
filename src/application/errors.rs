use crate::core::inventory_record::ItemId;
use crate::core::ports::GatewayError;
use crate::core::transaction::{MutationKind, RejectReason, Transaction};
use thiserror::Error;

/// Surfaced to the user once the local collection already agrees with the server again.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("failed to refresh inventory: {0}")]
    Load(#[source] GatewayError),

    #[error("failed to add \"{name}\": {source}")]
    Add { name: String, source: GatewayError },

    #[error("failed to update \"{name}\": {source}")]
    Update { name: String, source: GatewayError },

    #[error("failed to delete \"{name}\": {source}")]
    Delete { name: String, source: GatewayError },

    #[error("item {0} is not in the local inventory")]
    UnknownItem(ItemId),

    #[error("item identity cannot change from {from} to {to}")]
    IdentityChanged { from: ItemId, to: ItemId },

    #[error("inventory store is no longer running")]
    StoreClosed,
}

impl SyncError {
    pub fn rolled_back(txn: &Transaction, source: GatewayError) -> Self {
        let name = txn.item_name().to_string();
        match txn.kind {
            MutationKind::Create => SyncError::Add { name, source },
            MutationKind::Update => SyncError::Update { name, source },
            MutationKind::Delete => SyncError::Delete { name, source },
        }
    }

    pub fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            SyncError::Load(source)
            | SyncError::Add { source, .. }
            | SyncError::Update { source, .. }
            | SyncError::Delete { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<RejectReason> for SyncError {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::UnknownItem(id) => SyncError::UnknownItem(id),
            RejectReason::IdentityChanged { from, to } => SyncError::IdentityChanged { from, to },
        }
    }
}
