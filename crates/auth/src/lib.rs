//! # Papertrade Auth Crate
//!
//! Registration, login, and server-side sessions. Passwords are stored as
//! salted Argon2id hashes; sessions are opaque tokens with a configured
//! lifetime, looked up from the store on every authenticated request.

use chrono::Duration;
use core_types::SessionRecord;
use rust_decimal::Decimal;
use uuid::Uuid;

pub mod error;
pub mod password;
pub mod store;

pub use error::AuthError;
pub use store::AuthStore;

/// The auth service, generic over its persistence backend.
pub struct Auth<S: AuthStore> {
    store: S,
    session_ttl: Duration,
    starting_cash: Decimal,
}

impl<S: AuthStore> Auth<S> {
    pub fn new(store: S, session_ttl: Duration, starting_cash: Decimal) -> Self {
        Self {
            store,
            session_ttl,
            starting_cash,
        }
    }

    /// Registers a new account and logs it in.
    ///
    /// Fails on empty fields, a confirmation mismatch, or a taken username;
    /// none of those leave any trace in the store.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<SessionRecord, AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::MissingUsername);
        }
        if password.is_empty() || confirmation.is_empty() {
            return Err(AuthError::MissingPassword);
        }
        if password != confirmation {
            return Err(AuthError::PasswordMismatch);
        }

        let password_hash = password::hash_password(password)?;
        let user = self
            .store
            .create_user(username, &password_hash, self.starting_cash)
            .await?;
        tracing::info!(username, "Registered new account.");

        Ok(self.store.create_session(user.user_id, self.session_ttl).await?)
    }

    /// Logs a user in. An unknown username and a wrong password both come
    /// back as `InvalidCredentials`, indistinguishable to the caller.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionRecord, AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::MissingUsername);
        }
        if password.is_empty() {
            return Err(AuthError::MissingPassword);
        }

        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !password::verify_password(&user.password_hash, password)? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(self.store.create_session(user.user_id, self.session_ttl).await?)
    }

    /// Clears a session. A token that never existed or already expired is a
    /// no-op.
    pub async fn logout(&self, token: Uuid) -> Result<(), AuthError> {
        Ok(self.store.delete_session(token).await?)
    }

    /// Resolves a session token to its record, honoring expiry. `None` means
    /// the caller is not authenticated.
    pub async fn authenticate(&self, token: Uuid) -> Result<Option<SessionRecord>, AuthError> {
        Ok(self.store.get_session(token).await?)
    }
}
