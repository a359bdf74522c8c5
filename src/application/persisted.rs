// JSON documents in the key-value store.
//
// Responsibilities
// - Tell a missing document apart from one that cannot be read or decoded.
// - Write-through failures are logged and reported, never raised.

use crate::core::ports::{KeyValueStore, KvError};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub enum Loaded<T> {
    Missing,
    Found(T),
    Corrupt(serde_json::Error),
    Unavailable(KvError),
}

pub async fn read_json<T: DeserializeOwned>(kv: &dyn KeyValueStore, key: &str) -> Loaded<T> {
    match kv.get(key).await {
        Ok(None) => Loaded::Missing,
        Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
            Ok(value) => Loaded::Found(value),
            Err(err) => Loaded::Corrupt(err),
        },
        Err(err) => Loaded::Unavailable(err),
    }
}

/// Returns false when the value could not be persisted.
pub async fn write_json<T: Serialize + ?Sized>(
    kv: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> bool {
    let result = match serde_json::to_vec(value) {
        Ok(bytes) => kv.set(key, bytes).await,
        Err(err) => Err(KvError::from(err)),
    };
    match result {
        Ok(()) => true,
        Err(error) => {
            tracing::warn!(key, %error, "failed to persist, in-memory state kept for this session");
            false
        }
    }
}
