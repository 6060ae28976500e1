use rust_decimal::Decimal;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: Server,
    pub ledger: LedgerSettings,
    pub sessions: Sessions,
    pub quotes: Quotes,
}

/// Where the HTTP server binds.
#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

/// Parameters of the simulated ledger.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerSettings {
    /// The cash balance every newly registered account starts with.
    pub starting_cash: Decimal,
}

/// Server-side session policy.
#[derive(Debug, Clone, Deserialize)]
pub struct Sessions {
    /// How long a session token stays valid after login.
    pub ttl_minutes: i64,
}

/// The external quote-lookup service.
#[derive(Debug, Clone, Deserialize)]
pub struct Quotes {
    /// Base URL of the quote endpoint, without a trailing slash.
    pub base_url: String,
}
