use database::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("A username must be provided.")]
    MissingUsername,

    #[error("A password must be provided.")]
    MissingPassword,

    #[error("Password and confirmation do not match.")]
    PasswordMismatch,

    #[error("The username is already taken.")]
    DuplicateUsername,

    #[error("Invalid username and/or password.")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Auth store failure: {0}")]
    Store(DbError),
}

impl From<DbError> for AuthError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::DuplicateUsername => AuthError::DuplicateUsername,
            other => AuthError::Store(other),
        }
    }
}
