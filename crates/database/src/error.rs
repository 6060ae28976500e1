use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load environment variables for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Database query failed: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("The username is already taken.")]
    DuplicateUsername,

    #[error("Cash balance is too low to cover the trade.")]
    InsufficientCash,

    #[error("The account does not hold enough shares of the symbol.")]
    InsufficientShares,

    #[error("The requested data was not found in the database.")]
    NotFound,
}
