use std::sync::Arc;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::tokens::{SessionToken, TokenSigner};
use crate::db::models::User;
use crate::error::{AppError, AppResult};
use crate::repository::{RepositoryError, UserRepository};

const MISSING_CREDENTIALS: &str = "You must provide a username and password when logging in.";

/// Registration, login and token verification over the identity store.
pub struct CredentialService {
    users: Arc<dyn UserRepository>,
    signer: TokenSigner,
    hash_cost: u32,
}

impl CredentialService {
    pub fn new(users: Arc<dyn UserRepository>, signer: TokenSigner, hash_cost: u32) -> Self {
        Self {
            users,
            signer,
            hash_cost,
        }
    }

    pub async fn register(&self, username: &str, password: &str) -> AppResult<SessionToken> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::Validation(MISSING_CREDENTIALS.into()));
        }

        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::DuplicateUsername);
        }

        let hash = {
            let password = password.to_owned();
            let cost = self.hash_cost;
            tokio::task::spawn_blocking(move || hash_password(&password, cost)).await??
        };
        // The pre-check above races with concurrent registrations; the
        // unique index on username is authoritative.
        let user = match self.users.create(username, &hash).await {
            Ok(user) => user,
            Err(RepositoryError::UniqueViolation(_)) => return Err(AppError::DuplicateUsername),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = %user.id, "Registered user {}", user.username);
        Ok(self.signer.issue(&user.id)?)
    }

    /// Unknown usernames and wrong passwords fail identically.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<SessionToken> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::Validation(MISSING_CREDENTIALS.into()));
        }

        let Some(user) = self.users.find_by_username(username).await? else {
            tracing::debug!("Login failed: no such user");
            return Err(AppError::InvalidCredentials);
        };

        let matches = {
            let password = password.to_owned();
            let stored = user.password_hash.clone();
            tokio::task::spawn_blocking(move || verify_password(&password, &stored)).await?
        };
        if !matches {
            tracing::debug!(user_id = %user.id, "Login failed: password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        Ok(self.signer.issue(&user.id)?)
    }

    /// Returns the user id embedded in a valid token.
    pub fn verify(&self, token: &str) -> AppResult<String> {
        let claims = self.signer.verify(token)?;
        Ok(claims.user_id)
    }

    pub async fn find_user(&self, user_id: &str) -> AppResult<Option<User>> {
        Ok(self.users.find_by_id(user_id).await?)
    }
}
