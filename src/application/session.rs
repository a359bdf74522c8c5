// Sign-in session.
//
// Responsibilities
// - Log in and keep the bearer credential in the key-value store.
// - Register without signing in; the caller decides what to do with the credential.
// - Forget the credential on logout.

use crate::core::credential::{AuthRequest, Credential};
use crate::core::ports::{AuthError, Authenticator, KeyValueStore, KvError};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("could not store credential: {0}")]
    Storage(#[from] KvError),
}

pub struct AuthSession<TAuthenticator>
where
    TAuthenticator: Authenticator + 'static,
{
    authenticator: Arc<TAuthenticator>,
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl<TAuthenticator> AuthSession<TAuthenticator>
where
    TAuthenticator: Authenticator + 'static,
{
    pub fn new(
        authenticator: Arc<TAuthenticator>,
        kv: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            authenticator,
            kv,
            key: key.into(),
        }
    }

    pub async fn login(&self, username: &str, secret: &str) -> Result<Credential, SessionError> {
        let credential = self
            .authenticator
            .login(&AuthRequest::new(username, secret))
            .await?;
        self.kv
            .set(&self.key, credential.bearer().as_bytes().to_vec())
            .await?;
        tracing::info!(username, "signed in");
        Ok(credential)
    }

    pub async fn register(&self, username: &str, secret: &str) -> Result<Credential, SessionError> {
        let credential = self
            .authenticator
            .register(&AuthRequest::new(username, secret))
            .await?;
        tracing::info!(username, "account registered");
        Ok(credential)
    }

    pub async fn logout(&self) -> Result<(), SessionError> {
        self.kv.delete(&self.key).await?;
        tracing::info!("signed out");
        Ok(())
    }

    pub async fn credential(&self) -> Result<Option<Credential>, SessionError> {
        let stored = self.kv.get(&self.key).await?;
        Ok(stored
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .map(Credential::new))
    }
}
