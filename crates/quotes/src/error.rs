use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Failed to build or send the HTTP request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("The quote endpoint does not know the symbol.")]
    SymbolNotFound,

    #[error("The quote endpoint returned an unexpected status: {0}")]
    Status(u16),

    #[error("Failed to deserialize the quote response: {0}")]
    Deserialization(String),

    #[error("Invalid price in quote response: {0}")]
    InvalidPrice(String),
}
