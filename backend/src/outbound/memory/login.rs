//! `LoginService` checking salted password digests held in memory.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::ports::{LoginService, UserRepository};
use crate::domain::{EmailAddress, Error, LoginCredentials, PasswordDigest, UserId};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Authenticates against registered passwords; accounts come from the user
/// repository.
pub struct InMemoryLoginService {
    users: Arc<dyn UserRepository>,
    passwords: RwLock<HashMap<String, PasswordDigest>>,
}

impl InMemoryLoginService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            users,
            passwords: RwLock::new(HashMap::new()),
        }
    }

    /// Set the password for `email` under a fresh random salt.
    pub async fn set_password(&self, email: &EmailAddress, password: &str) {
        let salt = hex::encode(rand::random::<[u8; 16]>());
        self.passwords
            .write()
            .await
            .insert(email.as_str().to_owned(), PasswordDigest::derive(&salt, password));
    }
}

#[async_trait]
impl LoginService for InMemoryLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let email = credentials.email();
        let verified = self
            .passwords
            .read()
            .await
            .get(email.as_str())
            .is_some_and(|digest| digest.verify(credentials.password()));
        if !verified {
            debug!(email = email.as_str(), "login rejected");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        self.users
            .find_by_email(email)
            .await?
            .map(|user| user.id)
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))
    }
}
