use chrono::{DateTime, Utc};
use core_types::{TradeRecord, TradeSide};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The outcome of a completed buy or sell, echoed back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeReceipt {
    pub symbol: String,
    pub side: TradeSide,
    pub shares: i64,
    pub total: Decimal,
    pub cash_after: Decimal,
}

/// One holding priced at the current quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionView {
    pub symbol: String,
    pub quantity: i64,
    pub price: Decimal,
    pub value: Decimal,
}

/// The full portfolio: cash plus every priced holding and the grand total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioView {
    pub cash: Decimal,
    pub positions: Vec<PositionView>,
    pub total: Decimal,
}

/// One row of the transaction history as displayed to the user. The stored
/// record keeps only the trade total; the per-share price is derived here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeView {
    pub symbol: String,
    pub side: TradeSide,
    pub shares: i64,
    pub total: Decimal,
    pub price_per_share: Option<Decimal>,
    pub executed_at: DateTime<Utc>,
}

impl From<TradeRecord> for TradeView {
    fn from(record: TradeRecord) -> Self {
        let price_per_share = record.price_per_share();
        Self {
            symbol: record.symbol,
            side: record.side,
            shares: record.shares,
            total: record.total,
            price_per_share,
            executed_at: record.executed_at,
        }
    }
}
