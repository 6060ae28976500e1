use auth::AuthError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use database::DbError;
use ledger::LedgerError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("{0}")]
    Validation(String),
    #[error("Must be logged in.")]
    Unauthenticated,
}

/// Converts our custom `AppError` into an HTTP response. Every request
/// boundary recovers into a user-visible message; internal failures are
/// logged in full and surfaced sanitized.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Ledger(ledger_err) => match ledger_err {
                LedgerError::InvalidShares
                | LedgerError::MissingSymbol
                | LedgerError::SymbolNotFound
                | LedgerError::InsufficientFunds
                | LedgerError::InsufficientShares
                | LedgerError::ValueOutOfRange => {
                    (StatusCode::BAD_REQUEST, ledger_err.to_string())
                }
                LedgerError::Quote(e) => {
                    tracing::error!(error = ?e, "Quote lookup failed.");
                    (
                        StatusCode::BAD_GATEWAY,
                        "The quote service is unavailable".to_string(),
                    )
                }
                LedgerError::Store(e) => {
                    tracing::error!(error = ?e, "Ledger store error.");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An internal database error occurred".to_string(),
                    )
                }
            },
            AppError::Auth(auth_err) => match auth_err {
                AuthError::MissingUsername
                | AuthError::MissingPassword
                | AuthError::PasswordMismatch => (StatusCode::BAD_REQUEST, auth_err.to_string()),
                AuthError::DuplicateUsername => (StatusCode::CONFLICT, auth_err.to_string()),
                AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, auth_err.to_string()),
                AuthError::Hash(e) => {
                    tracing::error!(error = %e, "Password hashing error.");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An internal error occurred".to_string(),
                    )
                }
                AuthError::Store(e) => {
                    tracing::error!(error = ?e, "Auth store error.");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An internal database error occurred".to_string(),
                    )
                }
            },
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "Must be logged in.".to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
