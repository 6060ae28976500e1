// Ledger service tests: trade arithmetic, invariants, and failure paths,
// run against an in-memory store and a mock quote provider.

use async_trait::async_trait;
use chrono::Utc;
use core_types::{Holding, TradeRecord, TradeSide, User};
use database::DbError;
use ledger::{Ledger, LedgerError, LedgerStore};
use quotes::{QuoteError, QuoteProvider};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ═══════════════════════════════════════════════════════════════════
// Mock quote provider
// ═══════════════════════════════════════════════════════════════════

struct MockQuoteProvider {
    prices: HashMap<String, Decimal>,
}

impl MockQuoteProvider {
    fn new() -> Self {
        let mut prices = HashMap::new();
        prices.insert("NFLX".into(), dec!(20.00));
        prices.insert("AAPL".into(), dec!(189.70));
        prices.insert("ODD".into(), dec!(10.333));
        Self { prices }
    }

    fn set_price(&mut self, symbol: &str, price: Decimal) {
        self.prices.insert(symbol.to_string(), price);
    }
}

#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    async fn lookup(&self, symbol: &str) -> Result<core_types::Quote, QuoteError> {
        let price = self
            .prices
            .get(symbol)
            .copied()
            .ok_or(QuoteError::SymbolNotFound)?;
        Ok(core_types::Quote {
            symbol: symbol.to_string(),
            name: format!("{symbol} Inc."),
            price,
        })
    }
}

/// A provider whose upstream is down; every lookup fails hard.
struct BrokenQuoteProvider;

#[async_trait]
impl QuoteProvider for BrokenQuoteProvider {
    async fn lookup(&self, _symbol: &str) -> Result<core_types::Quote, QuoteError> {
        Err(QuoteError::Status(502))
    }
}

// ═══════════════════════════════════════════════════════════════════
// In-memory store enforcing the same arithmetic rules as the SQL one
// ═══════════════════════════════════════════════════════════════════

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    holdings: HashMap<(Uuid, String), i64>,
    trades: Vec<TradeRecord>,
}

#[derive(Clone, Default)]
struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    fn add_user(&self, cash: Decimal) -> Uuid {
        let user_id = Uuid::new_v4();
        let user = User {
            user_id,
            username: format!("user-{user_id}"),
            password_hash: "unused".into(),
            cash,
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().users.insert(user_id, user);
        user_id
    }

    fn cash(&self, user_id: Uuid) -> Decimal {
        self.state.lock().unwrap().users[&user_id].cash
    }

    fn quantity(&self, user_id: Uuid, symbol: &str) -> Option<i64> {
        self.state
            .lock()
            .unwrap()
            .holdings
            .get(&(user_id, symbol.to_string()))
            .copied()
    }

    fn trade_count(&self, user_id: Uuid) -> usize {
        self.state
            .lock()
            .unwrap()
            .trades
            .iter()
            .filter(|t| t.user_id == user_id)
            .count()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn fetch_user(&self, user_id: Uuid) -> Result<User, DbError> {
        self.state
            .lock()
            .unwrap()
            .users
            .get(&user_id)
            .cloned()
            .ok_or(DbError::NotFound)
    }

    async fn holdings_for_user(&self, user_id: Uuid) -> Result<Vec<Holding>, DbError> {
        let state = self.state.lock().unwrap();
        let mut holdings: Vec<Holding> = state
            .holdings
            .iter()
            .filter(|((id, _), _)| *id == user_id)
            .map(|((_, symbol), quantity)| Holding {
                user_id,
                symbol: symbol.clone(),
                quantity: *quantity,
            })
            .collect();
        holdings.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(holdings)
    }

    async fn trades_for_user(&self, user_id: Uuid) -> Result<Vec<TradeRecord>, DbError> {
        let state = self.state.lock().unwrap();
        // Newest first, matching the SQL ORDER BY executed_at DESC.
        Ok(state
            .trades
            .iter()
            .filter(|t| t.user_id == user_id)
            .rev()
            .cloned()
            .collect())
    }

    async fn execute_buy(
        &self,
        user_id: Uuid,
        symbol: &str,
        shares: i64,
        total: Decimal,
    ) -> Result<Decimal, DbError> {
        let mut state = self.state.lock().unwrap();
        let cash = state.users.get(&user_id).ok_or(DbError::NotFound)?.cash;
        if cash < total {
            return Err(DbError::InsufficientCash);
        }
        let new_cash = cash - total;
        state.users.get_mut(&user_id).unwrap().cash = new_cash;
        *state
            .holdings
            .entry((user_id, symbol.to_string()))
            .or_insert(0) += shares;
        state.trades.push(TradeRecord {
            trade_id: Uuid::new_v4(),
            user_id,
            symbol: symbol.to_string(),
            shares,
            total,
            side: TradeSide::Buy,
            executed_at: Utc::now(),
        });
        Ok(new_cash)
    }

    async fn execute_sell(
        &self,
        user_id: Uuid,
        symbol: &str,
        shares: i64,
        total: Decimal,
    ) -> Result<Decimal, DbError> {
        let mut state = self.state.lock().unwrap();
        // Account first, then the holding, same order as the SQL transaction.
        let cash = state.users.get(&user_id).ok_or(DbError::NotFound)?.cash;
        let key = (user_id, symbol.to_string());
        let held = state.holdings.get(&key).copied().unwrap_or(0);
        if held < shares {
            return Err(DbError::InsufficientShares);
        }
        if held == shares {
            state.holdings.remove(&key);
        } else {
            *state.holdings.get_mut(&key).unwrap() -= shares;
        }
        let new_cash = cash + total;
        state.users.get_mut(&user_id).unwrap().cash = new_cash;
        state.trades.push(TradeRecord {
            trade_id: Uuid::new_v4(),
            user_id,
            symbol: symbol.to_string(),
            shares,
            total,
            side: TradeSide::Sell,
            executed_at: Utc::now(),
        });
        Ok(new_cash)
    }
}

fn ledger_with(store: &MemoryStore) -> Ledger<MemoryStore> {
    Ledger::new(store.clone(), Arc::new(MockQuoteProvider::new()))
}

// ═══════════════════════════════════════════════════════════════════
// Buy
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn buy_debits_cash_and_records_one_trade() {
    let store = MemoryStore::default();
    let user_id = store.add_user(dec!(10000.00));
    let ledger = ledger_with(&store);

    let receipt = ledger.buy(user_id, "nflx", 10).await.unwrap();

    assert_eq!(receipt.symbol, "NFLX");
    assert_eq!(receipt.side, TradeSide::Buy);
    assert_eq!(receipt.total, dec!(200.00));
    assert_eq!(receipt.cash_after, dec!(9800.00));
    assert_eq!(store.cash(user_id), dec!(9800.00));
    assert_eq!(store.quantity(user_id, "NFLX"), Some(10));
    assert_eq!(store.trade_count(user_id), 1);
}

#[tokio::test]
async fn repeat_buys_accumulate_the_holding() {
    let store = MemoryStore::default();
    let user_id = store.add_user(dec!(10000.00));
    let ledger = ledger_with(&store);

    ledger.buy(user_id, "NFLX", 4).await.unwrap();
    ledger.buy(user_id, "NFLX", 6).await.unwrap();

    assert_eq!(store.quantity(user_id, "NFLX"), Some(10));
    assert_eq!(store.cash(user_id), dec!(9800.00));
    assert_eq!(store.trade_count(user_id), 2);
}

#[tokio::test]
async fn buy_cost_is_rounded_to_cents() {
    let store = MemoryStore::default();
    let user_id = store.add_user(dec!(100.00));
    let ledger = ledger_with(&store);

    // 10.333 * 3 = 30.999, which must land as 31.00.
    let receipt = ledger.buy(user_id, "ODD", 3).await.unwrap();

    assert_eq!(receipt.total, dec!(31.00));
    assert_eq!(store.cash(user_id), dec!(69.00));
}

#[tokio::test]
async fn buy_beyond_cash_fails_and_changes_nothing() {
    let store = MemoryStore::default();
    let user_id = store.add_user(dec!(100.00));
    let ledger = ledger_with(&store);

    let err = ledger.buy(user_id, "AAPL", 10).await.unwrap_err();

    assert!(matches!(err, LedgerError::InsufficientFunds));
    assert_eq!(store.cash(user_id), dec!(100.00));
    assert_eq!(store.quantity(user_id, "AAPL"), None);
    assert_eq!(store.trade_count(user_id), 0);
}

#[tokio::test]
async fn buy_rejects_non_positive_shares() {
    let store = MemoryStore::default();
    let user_id = store.add_user(dec!(10000.00));
    let ledger = ledger_with(&store);

    for shares in [0, -3] {
        let err = ledger.buy(user_id, "NFLX", shares).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidShares));
    }
    assert_eq!(store.trade_count(user_id), 0);
}

#[tokio::test]
async fn buy_of_unknown_symbol_is_a_validation_failure() {
    let store = MemoryStore::default();
    let user_id = store.add_user(dec!(10000.00));
    let ledger = ledger_with(&store);

    let err = ledger.buy(user_id, "ZZZZ", 1).await.unwrap_err();

    assert!(matches!(err, LedgerError::SymbolNotFound));
    assert_eq!(store.cash(user_id), dec!(10000.00));
}

#[tokio::test]
async fn blank_symbol_is_rejected_before_lookup() {
    let store = MemoryStore::default();
    let user_id = store.add_user(dec!(10000.00));
    let ledger = Ledger::new(store.clone(), Arc::new(BrokenQuoteProvider));

    let err = ledger.buy(user_id, "   ", 1).await.unwrap_err();

    assert!(matches!(err, LedgerError::MissingSymbol));
}

#[tokio::test]
async fn buy_with_an_overflowing_total_is_an_error_not_a_panic() {
    let store = MemoryStore::default();
    let user_id = store.add_user(dec!(10000.00));
    let mut provider = MockQuoteProvider::new();
    provider.set_price("HUGE", dec!(10000000000));
    let ledger = Ledger::new(store.clone(), Arc::new(provider));

    // price * shares exceeds what Decimal can represent.
    let err = ledger.buy(user_id, "HUGE", i64::MAX).await.unwrap_err();

    assert!(matches!(err, LedgerError::ValueOutOfRange));
    assert_eq!(store.cash(user_id), dec!(10000.00));
    assert_eq!(store.quantity(user_id, "HUGE"), None);
    assert_eq!(store.trade_count(user_id), 0);
}

// ═══════════════════════════════════════════════════════════════════
// Sell
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn selling_the_whole_position_removes_the_holding() {
    let store = MemoryStore::default();
    let user_id = store.add_user(dec!(10000.00));
    let mut provider = MockQuoteProvider::new();
    let ledger = Ledger::new(store.clone(), Arc::new(MockQuoteProvider::new()));

    ledger.buy(user_id, "NFLX", 10).await.unwrap();
    assert_eq!(store.cash(user_id), dec!(9800.00));

    // Price moves to 25.00 before the sell.
    provider.set_price("NFLX", dec!(25.00));
    let ledger = Ledger::new(store.clone(), Arc::new(provider));
    let receipt = ledger.sell(user_id, "NFLX", 10).await.unwrap();

    assert_eq!(receipt.side, TradeSide::Sell);
    assert_eq!(receipt.total, dec!(250.00));
    assert_eq!(store.cash(user_id), dec!(10050.00));
    assert_eq!(store.quantity(user_id, "NFLX"), None);
    assert_eq!(store.trade_count(user_id), 2);
}

#[tokio::test]
async fn partial_sell_decrements_the_holding() {
    let store = MemoryStore::default();
    let user_id = store.add_user(dec!(10000.00));
    let ledger = ledger_with(&store);

    ledger.buy(user_id, "NFLX", 10).await.unwrap();
    ledger.sell(user_id, "NFLX", 4).await.unwrap();

    assert_eq!(store.quantity(user_id, "NFLX"), Some(6));
    assert_eq!(store.cash(user_id), dec!(9880.00));
}

#[tokio::test]
async fn overselling_fails_and_changes_nothing() {
    let store = MemoryStore::default();
    let user_id = store.add_user(dec!(10000.00));
    let ledger = ledger_with(&store);

    ledger.buy(user_id, "NFLX", 5).await.unwrap();
    let err = ledger.sell(user_id, "NFLX", 6).await.unwrap_err();

    assert!(matches!(err, LedgerError::InsufficientShares));
    assert_eq!(store.quantity(user_id, "NFLX"), Some(5));
    assert_eq!(store.cash(user_id), dec!(9900.00));
    assert_eq!(store.trade_count(user_id), 1);
}

#[tokio::test]
async fn selling_a_symbol_never_held_fails() {
    let store = MemoryStore::default();
    let user_id = store.add_user(dec!(10000.00));
    let ledger = ledger_with(&store);

    let err = ledger.sell(user_id, "AAPL", 1).await.unwrap_err();

    assert!(matches!(err, LedgerError::InsufficientShares));
    assert_eq!(store.trade_count(user_id), 0);
}

#[tokio::test]
async fn sell_rejects_non_positive_shares() {
    let store = MemoryStore::default();
    let user_id = store.add_user(dec!(10000.00));
    let ledger = ledger_with(&store);

    ledger.buy(user_id, "NFLX", 5).await.unwrap();
    for shares in [0, -1] {
        let err = ledger.sell(user_id, "NFLX", shares).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidShares));
    }
    assert_eq!(store.quantity(user_id, "NFLX"), Some(5));
}

#[tokio::test]
async fn sell_resolves_the_account_before_the_holding() {
    let store = MemoryStore::default();
    let ledger = ledger_with(&store);

    // An unknown account fails on the user lookup, not on a missing holding.
    let err = ledger.sell(Uuid::new_v4(), "NFLX", 1).await.unwrap_err();

    assert!(matches!(err, LedgerError::Store(DbError::NotFound)));
}

#[tokio::test]
async fn sell_with_an_overflowing_total_is_an_error_not_a_panic() {
    let store = MemoryStore::default();
    let user_id = store.add_user(dec!(10000.00));
    let mut provider = MockQuoteProvider::new();
    provider.set_price("HUGE", dec!(10000000000));
    let ledger = Ledger::new(store.clone(), Arc::new(provider));

    let err = ledger.sell(user_id, "HUGE", i64::MAX).await.unwrap_err();

    assert!(matches!(err, LedgerError::ValueOutOfRange));
    assert_eq!(store.cash(user_id), dec!(10000.00));
    assert_eq!(store.trade_count(user_id), 0);
}

// ═══════════════════════════════════════════════════════════════════
// Valuation & history
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn valuation_totals_cash_plus_priced_holdings() {
    let store = MemoryStore::default();
    let user_id = store.add_user(dec!(10000.00));
    let ledger = ledger_with(&store);

    ledger.buy(user_id, "NFLX", 10).await.unwrap(); // 200.00
    ledger.buy(user_id, "AAPL", 2).await.unwrap(); // 379.40

    let portfolio = ledger.valuation(user_id).await.unwrap();

    assert_eq!(portfolio.cash, dec!(9420.60));
    assert_eq!(portfolio.positions.len(), 2);
    // Holdings come back sorted by symbol.
    assert_eq!(portfolio.positions[0].symbol, "AAPL");
    assert_eq!(portfolio.positions[0].value, dec!(379.40));
    assert_eq!(portfolio.positions[1].symbol, "NFLX");
    assert_eq!(portfolio.positions[1].value, dec!(200.00));
    assert_eq!(portfolio.total, dec!(10000.00));
}

#[tokio::test]
async fn valuation_surfaces_quote_failures() {
    let store = MemoryStore::default();
    let user_id = store.add_user(dec!(10000.00));
    let ledger = ledger_with(&store);
    ledger.buy(user_id, "NFLX", 1).await.unwrap();

    let broken = Ledger::new(store.clone(), Arc::new(BrokenQuoteProvider));
    let err = broken.valuation(user_id).await.unwrap_err();

    assert!(matches!(err, LedgerError::Quote(_)));
}

#[tokio::test]
async fn history_is_newest_first_with_derived_per_share_price() {
    let store = MemoryStore::default();
    let user_id = store.add_user(dec!(10000.00));
    let ledger = ledger_with(&store);

    ledger.buy(user_id, "NFLX", 10).await.unwrap();
    ledger.sell(user_id, "NFLX", 4).await.unwrap();

    let history = ledger.history(user_id).await.unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].side, TradeSide::Sell);
    assert_eq!(history[0].shares, 4);
    assert_eq!(history[0].price_per_share, Some(dec!(20.00)));
    assert_eq!(history[1].side, TradeSide::Buy);
    assert_eq!(history[1].shares, 10);
}

#[tokio::test]
async fn quote_normalizes_the_symbol() {
    let store = MemoryStore::default();
    store.add_user(dec!(10000.00));
    let ledger = ledger_with(&store);

    let quote = ledger.quote(" nflx ").await.unwrap();

    assert_eq!(quote.symbol, "NFLX");
    assert_eq!(quote.price, dec!(20.00));
}
