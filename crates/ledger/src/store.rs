use async_trait::async_trait;
use core_types::{Holding, TradeRecord, User};
use database::{DbError, DbRepository};
use rust_decimal::Decimal;
use uuid::Uuid;

/// The persistence contract the ledger service runs against. The production
/// implementation is `database::DbRepository`; tests substitute an in-memory
/// store that enforces the same arithmetic rules.
///
/// `execute_buy` and `execute_sell` must be atomic: either every mutation
/// (cash, holding, trade log) lands, or none do. Both return the cash
/// balance after the trade.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn fetch_user(&self, user_id: Uuid) -> Result<User, DbError>;

    async fn holdings_for_user(&self, user_id: Uuid) -> Result<Vec<Holding>, DbError>;

    async fn trades_for_user(&self, user_id: Uuid) -> Result<Vec<TradeRecord>, DbError>;

    async fn execute_buy(
        &self,
        user_id: Uuid,
        symbol: &str,
        shares: i64,
        total: Decimal,
    ) -> Result<Decimal, DbError>;

    async fn execute_sell(
        &self,
        user_id: Uuid,
        symbol: &str,
        shares: i64,
        total: Decimal,
    ) -> Result<Decimal, DbError>;
}

#[async_trait]
impl LedgerStore for DbRepository {
    async fn fetch_user(&self, user_id: Uuid) -> Result<User, DbError> {
        self.get_user(user_id).await
    }

    async fn holdings_for_user(&self, user_id: Uuid) -> Result<Vec<Holding>, DbError> {
        DbRepository::holdings_for_user(self, user_id).await
    }

    async fn trades_for_user(&self, user_id: Uuid) -> Result<Vec<TradeRecord>, DbError> {
        DbRepository::trades_for_user(self, user_id).await
    }

    async fn execute_buy(
        &self,
        user_id: Uuid,
        symbol: &str,
        shares: i64,
        total: Decimal,
    ) -> Result<Decimal, DbError> {
        DbRepository::execute_buy(self, user_id, symbol, shares, total).await
    }

    async fn execute_sell(
        &self,
        user_id: Uuid,
        symbol: &str,
        shares: i64,
        total: Decimal,
    ) -> Result<Decimal, DbError> {
        DbRepository::execute_sell(self, user_id, symbol, shares, total).await
    }
}
