// Mapping between inventory API responses and gateway results.
//
// Purpose
// - Give a transport adapter one place to turn (status, body) pairs into
//   records, credentials or categorized gateway errors.
//
// Responsibilities
// - Prefer the server's own `message` or `error` text for rejections.
// - Report undecodable success bodies as malformed responses.

use crate::core::credential::Credential;
use crate::core::inventory_record::{InventoryRecord, ItemId};
use crate::core::ports::{AuthError, GatewayError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemEnvelope {
    item: InventoryRecord,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteItemPayload<'a> {
    pub id: &'a ItemId,
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn server_message(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    parsed.message.or(parsed.error)
}

pub fn classify_failure(status: u16, body: &[u8]) -> GatewayError {
    if matches!(status, 401 | 403) {
        return GatewayError::Unauthorized;
    }
    match server_message(body) {
        Some(message) => GatewayError::ServerRejected(message),
        None if status == 404 => GatewayError::InvalidTarget,
        None => GatewayError::ServerRejected(format!("status {status}")),
    }
}

fn decode<T: serde::de::DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, GatewayError> {
    if !is_success(status) {
        return Err(classify_failure(status, body));
    }
    serde_json::from_slice(body).map_err(|e| GatewayError::MalformedResponse(e.to_string()))
}

pub fn decode_item_list(status: u16, body: &[u8]) -> Result<Vec<InventoryRecord>, GatewayError> {
    decode(status, body)
}

pub fn decode_item_envelope(status: u16, body: &[u8]) -> Result<InventoryRecord, GatewayError> {
    decode::<ItemEnvelope>(status, body).map(|envelope| envelope.item)
}

pub fn decode_acknowledgement(status: u16, body: &[u8]) -> Result<(), GatewayError> {
    if is_success(status) {
        Ok(())
    } else {
        Err(classify_failure(status, body))
    }
}

pub fn decode_credential(status: u16, body: &[u8]) -> Result<Credential, AuthError> {
    if !is_success(status) {
        let message = server_message(body).unwrap_or_else(|| format!("status {status}"));
        return Err(match status {
            409 => AuthError::UsernameTaken,
            _ => AuthError::InvalidCredentials(message),
        });
    }
    serde_json::from_slice::<TokenResponse>(body)
        .map(|token| Credential::new(token.access_token))
        .map_err(|e| AuthError::MalformedResponse(e.to_string()))
}
