use crate::enums::TradeSide;
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Rounds a money amount to two decimal places, away from zero on midpoints.
/// Every cash mutation in the ledger goes through this before it is persisted.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// The total value of `shares` at `price`, rounded to cents. Both operands
/// cross the trust boundary (form input and provider data), so the multiply
/// is checked rather than left to panic on `Decimal` overflow.
pub fn trade_value(price: Decimal, shares: i64) -> Result<Decimal, CoreError> {
    price
        .checked_mul(Decimal::from(shares))
        .map(round_money)
        .ok_or_else(|| {
            CoreError::Calculation(format!("value of {shares} shares at {price} overflowed"))
        })
}

/// A registered account. `cash` is the simulated balance and is never negative.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub cash: Decimal,
    pub created_at: DateTime<Utc>,
}

/// A user's current position in one symbol. Rows only exist while quantity > 0.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Holding {
    pub user_id: Uuid,
    pub symbol: String,
    pub quantity: i64,
}

/// One executed trade in the append-only log. `total` is the full transaction
/// value; the per-share price is derived on display rather than stored.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TradeRecord {
    pub trade_id: Uuid,
    pub user_id: Uuid,
    pub symbol: String,
    pub shares: i64,
    pub total: Decimal,
    #[sqlx(try_from = "String")]
    pub side: TradeSide,
    pub executed_at: DateTime<Utc>,
}

impl TradeRecord {
    /// The implied per-share price, rounded to cents. `None` for a corrupt
    /// row with zero shares, which the schema forbids.
    pub fn price_per_share(&self) -> Option<Decimal> {
        if self.shares == 0 {
            return None;
        }
        Some(round_money(self.total / Decimal::from(self.shares)))
    }
}

/// A server-side session, keyed by an opaque token handed to the browser.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A current market quote supplied by the external quote provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: Decimal,
}
