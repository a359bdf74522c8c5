// In memory implementation of the Authenticator port.
//
// Responsibilities
// - Keep username -> password hash pairs and issue opaque bearer tokens.

use crate::core::credential::{AuthRequest, Credential};
use crate::core::ports::{AuthError, Authenticator};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryAuthenticator {
    users: RwLock<HashMap<String, String>>,
}

impl InMemoryAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue() -> Credential {
        Credential::new(format!("token-{}", Uuid::now_v7()))
    }
}

#[async_trait::async_trait]
impl Authenticator for InMemoryAuthenticator {
    async fn login(&self, request: &AuthRequest) -> Result<Credential, AuthError> {
        let users = self.users.read().await;
        match users.get(&request.username) {
            Some(hash) if *hash == request.client_password_hash => Ok(Self::issue()),
            Some(_) => Err(AuthError::InvalidCredentials(
                "Password is incorrect".into(),
            )),
            None => Err(AuthError::InvalidCredentials("Unknown user".into())),
        }
    }

    async fn register(&self, request: &AuthRequest) -> Result<Credential, AuthError> {
        let mut users = self.users.write().await;
        if users.contains_key(&request.username) {
            return Err(AuthError::UsernameTaken);
        }
        users.insert(
            request.username.clone(),
            request.client_password_hash.clone(),
        );
        Ok(Self::issue())
    }
}

#[cfg(test)]
mod in_memory_authenticator_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn it_should_log_in_a_registered_user() {
        let auth = InMemoryAuthenticator::new();
        auth.register(&AuthRequest::new("connor", "pw")).await.unwrap();
        assert!(auth.login(&AuthRequest::new("connor", "pw")).await.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_a_wrong_password_and_a_duplicate_username() {
        let auth = InMemoryAuthenticator::new();
        auth.register(&AuthRequest::new("connor", "pw")).await.unwrap();
        assert!(matches!(
            auth.login(&AuthRequest::new("connor", "nope")).await,
            Err(AuthError::InvalidCredentials(_))
        ));
        assert_eq!(
            auth.register(&AuthRequest::new("connor", "pw")).await,
            Err(AuthError::UsernameTaken)
        );
    }
}
