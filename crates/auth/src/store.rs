use async_trait::async_trait;
use chrono::Duration;
use core_types::{SessionRecord, User};
use database::{DbError, DbRepository};
use rust_decimal::Decimal;
use uuid::Uuid;

/// The persistence contract for accounts and sessions. The production
/// implementation is `database::DbRepository`; tests substitute an in-memory
/// store.
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Must fail with `DbError::DuplicateUsername` when the username exists,
    /// leaving the users table unchanged.
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        starting_cash: Decimal,
    ) -> Result<User, DbError>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError>;

    async fn create_session(&self, user_id: Uuid, ttl: Duration) -> Result<SessionRecord, DbError>;

    /// Expired sessions must come back as `None`.
    async fn get_session(&self, token: Uuid) -> Result<Option<SessionRecord>, DbError>;

    async fn delete_session(&self, token: Uuid) -> Result<(), DbError>;
}

#[async_trait]
impl AuthStore for DbRepository {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        starting_cash: Decimal,
    ) -> Result<User, DbError> {
        DbRepository::create_user(self, username, password_hash, starting_cash).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        DbRepository::get_user_by_username(self, username).await
    }

    async fn create_session(&self, user_id: Uuid, ttl: Duration) -> Result<SessionRecord, DbError> {
        DbRepository::create_session(self, user_id, ttl).await
    }

    async fn get_session(&self, token: Uuid) -> Result<Option<SessionRecord>, DbError> {
        DbRepository::get_session(self, token).await
    }

    async fn delete_session(&self, token: Uuid) -> Result<(), DbError> {
        DbRepository::delete_session(self, token).await
    }
}
