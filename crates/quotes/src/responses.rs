use crate::error::QuoteError;
use core_types::Quote;
use rust_decimal::Decimal;
use serde::Deserialize;

/// The raw JSON body returned by the quote endpoint. Field aliases cover the
/// two shapes seen in the wild (plain and IEX-style keys).
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteResponse {
    pub symbol: String,
    #[serde(alias = "companyName", alias = "displayName")]
    pub name: String,
    #[serde(alias = "latestPrice")]
    pub price: Decimal,
}

impl QuoteResponse {
    /// Converts the raw response into the domain `Quote`, normalizing the
    /// symbol to uppercase and rejecting non-positive prices.
    pub fn into_quote(self) -> Result<Quote, QuoteError> {
        if self.price <= Decimal::ZERO {
            return Err(QuoteError::InvalidPrice(self.price.to_string()));
        }
        Ok(Quote {
            symbol: self.symbol.to_uppercase(),
            name: self.name,
            price: self.price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_plain_response() {
        let body = r#"{"symbol": "nflx", "name": "Netflix, Inc.", "price": 180.25}"#;
        let response: QuoteResponse = serde_json::from_str(body).unwrap();
        let quote = response.into_quote().unwrap();
        assert_eq!(quote.symbol, "NFLX");
        assert_eq!(quote.name, "Netflix, Inc.");
        assert_eq!(quote.price, dec!(180.25));
    }

    #[test]
    fn parses_iex_style_keys_and_string_price() {
        let body = r#"{"symbol": "AAPL", "companyName": "Apple Inc.", "latestPrice": "189.70"}"#;
        let response: QuoteResponse = serde_json::from_str(body).unwrap();
        let quote = response.into_quote().unwrap();
        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.price, dec!(189.70));
    }

    #[test]
    fn rejects_non_positive_price() {
        let body = r#"{"symbol": "AAPL", "name": "Apple Inc.", "price": 0}"#;
        let response: QuoteResponse = serde_json::from_str(body).unwrap();
        assert!(response.into_quote().is_err());
    }
}
