//! # Papertrade Ledger Crate
//!
//! The ledger service owns the trading rules of the simulator: it validates
//! trade requests, prices them against the quote provider, and hands the
//! resulting atomic mutation to the store. It never touches SQL itself and
//! never mutates state outside a single `execute_buy`/`execute_sell` call,
//! so a store failure leaves the ledger exactly as it was.

use core_types::{Quote, trade_value};
use quotes::QuoteProvider;
use std::sync::Arc;
use uuid::Uuid;

pub mod error;
pub mod store;
pub mod views;

pub use error::LedgerError;
pub use store::LedgerStore;
pub use views::{PortfolioView, PositionView, TradeReceipt, TradeView};

use core_types::TradeSide;

/// The ledger service, generic over its persistence backend.
pub struct Ledger<S: LedgerStore> {
    store: S,
    quotes: Arc<dyn QuoteProvider>,
}

impl<S: LedgerStore> Ledger<S> {
    pub fn new(store: S, quotes: Arc<dyn QuoteProvider>) -> Self {
        Self { store, quotes }
    }

    /// Buys `shares` of `symbol` at the current quoted price.
    ///
    /// The cost is the quoted price times the share count, rounded to cents.
    /// Fails with `InsufficientFunds` when the cost exceeds the cash balance,
    /// in which case no state changes at all.
    pub async fn buy(
        &self,
        user_id: Uuid,
        symbol: &str,
        shares: i64,
    ) -> Result<TradeReceipt, LedgerError> {
        let symbol = normalize_symbol(symbol)?;
        if shares <= 0 {
            return Err(LedgerError::InvalidShares);
        }

        let quote = self.quotes.lookup(&symbol).await?;
        let total = trade_value(quote.price, shares)?;

        let cash_after = self.store.execute_buy(user_id, &symbol, shares, total).await?;
        tracing::info!(%user_id, %symbol, shares, %total, "Executed buy.");

        Ok(TradeReceipt {
            symbol,
            side: TradeSide::Buy,
            shares,
            total,
            cash_after,
        })
    }

    /// Sells `shares` of `symbol` at the current quoted price.
    ///
    /// Fails with `InsufficientShares` when the account holds fewer shares
    /// than requested; the ledger is left unchanged on any failure.
    pub async fn sell(
        &self,
        user_id: Uuid,
        symbol: &str,
        shares: i64,
    ) -> Result<TradeReceipt, LedgerError> {
        let symbol = normalize_symbol(symbol)?;
        if shares <= 0 {
            return Err(LedgerError::InvalidShares);
        }

        let quote = self.quotes.lookup(&symbol).await?;
        let total = trade_value(quote.price, shares)?;

        let cash_after = self.store.execute_sell(user_id, &symbol, shares, total).await?;
        tracing::info!(%user_id, %symbol, shares, %total, "Executed sell.");

        Ok(TradeReceipt {
            symbol,
            side: TradeSide::Sell,
            shares,
            total,
            cash_after,
        })
    }

    /// Prices every holding at the current quote and returns the portfolio:
    /// cash, per-symbol values, and the grand total.
    ///
    /// A failed quote lookup surfaces as an error; the valuation never falls
    /// back to a stale or partial price.
    pub async fn valuation(&self, user_id: Uuid) -> Result<PortfolioView, LedgerError> {
        let user = self.store.fetch_user(user_id).await?;
        let holdings = self.store.holdings_for_user(user_id).await?;

        let mut positions = Vec::with_capacity(holdings.len());
        let mut total = user.cash;
        for holding in holdings {
            let quote = self.quotes.lookup(&holding.symbol).await?;
            let value = trade_value(quote.price, holding.quantity)?;
            total = total.checked_add(value).ok_or(LedgerError::ValueOutOfRange)?;
            positions.push(PositionView {
                symbol: holding.symbol,
                quantity: holding.quantity,
                price: quote.price,
                value,
            });
        }

        Ok(PortfolioView {
            cash: user.cash,
            positions,
            total,
        })
    }

    /// Returns the user's full trade log, newest first.
    pub async fn history(&self, user_id: Uuid) -> Result<Vec<TradeView>, LedgerError> {
        let trades = self.store.trades_for_user(user_id).await?;
        Ok(trades.into_iter().map(TradeView::from).collect())
    }

    /// Looks up the current quote for a symbol.
    pub async fn quote(&self, symbol: &str) -> Result<Quote, LedgerError> {
        let symbol = normalize_symbol(symbol)?;
        Ok(self.quotes.lookup(&symbol).await?)
    }
}

/// Symbols are matched case-insensitively against the quote service and
/// stored uppercase.
fn normalize_symbol(symbol: &str) -> Result<String, LedgerError> {
    let trimmed = symbol.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::MissingSymbol);
    }
    Ok(trimmed.to_uppercase())
}
