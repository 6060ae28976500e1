use core_types::CoreError;
use database::DbError;
use quotes::QuoteError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Shares must be a positive whole number.")]
    InvalidShares,

    #[error("The trade value is out of range.")]
    ValueOutOfRange,

    #[error("A stock symbol must be provided.")]
    MissingSymbol,

    #[error("No such symbol is known to the quote service.")]
    SymbolNotFound,

    #[error("Cash balance is too low to cover the purchase.")]
    InsufficientFunds,

    #[error("The account does not hold enough shares to sell.")]
    InsufficientShares,

    #[error("Quote lookup failed: {0}")]
    Quote(QuoteError),

    #[error("Ledger store failure: {0}")]
    Store(DbError),
}

impl From<CoreError> for LedgerError {
    fn from(_: CoreError) -> Self {
        LedgerError::ValueOutOfRange
    }
}

impl From<QuoteError> for LedgerError {
    fn from(e: QuoteError) -> Self {
        match e {
            QuoteError::SymbolNotFound => LedgerError::SymbolNotFound,
            other => LedgerError::Quote(other),
        }
    }
}

impl From<DbError> for LedgerError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::InsufficientCash => LedgerError::InsufficientFunds,
            DbError::InsufficientShares => LedgerError::InsufficientShares,
            other => LedgerError::Store(other),
        }
    }
}
