use async_trait::async_trait;
use core_types::Quote;
use reqwest::StatusCode;

pub mod error;
pub mod responses;

// --- Public API ---
pub use error::QuoteError;
pub use responses::QuoteResponse;

/// The generic, abstract interface for a quote provider.
/// This trait is the contract the ledger uses, allowing the underlying
/// implementation (live HTTP or mock) to be swapped out.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetches the current quote for a symbol. Unknown symbols are a
    /// `SymbolNotFound` error, which callers treat as a validation failure
    /// rather than a fatal one.
    async fn lookup(&self, symbol: &str) -> Result<Quote, QuoteError>;
}

/// A concrete `QuoteProvider` backed by the external HTTP quote endpoint.
#[derive(Clone)]
pub struct HttpQuoteClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpQuoteClient {
    pub fn new(base_url: &str) -> Result<Self, QuoteError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl QuoteProvider for HttpQuoteClient {
    async fn lookup(&self, symbol: &str) -> Result<Quote, QuoteError> {
        let url = format!("{}/quote", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol)])
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(QuoteError::SymbolNotFound),
            other => return Err(QuoteError::Status(other.as_u16())),
        }

        let body: QuoteResponse = response
            .json()
            .await
            .map_err(|e| QuoteError::Deserialization(e.to_string()))?;

        body.into_quote()
    }
}
