use crate::DbError;
use chrono::{Duration, Utc};
use core_types::{Holding, SessionRecord, TradeRecord, TradeSide, User};
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use uuid::Uuid;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==========================================================================
    // Users
    // ==========================================================================

    /// Inserts a new user row with the configured starting cash balance.
    /// A unique-constraint violation on the username surfaces as `DuplicateUsername`.
    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        starting_cash: Decimal,
    ) -> Result<User, DbError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, username, password_hash, cash, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING user_id, username, password_hash, cash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .bind(starting_cash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                DbError::DuplicateUsername
            } else {
                e.into()
            }
        })?;

        Ok(user)
    }

    /// Fetches a user by primary key.
    pub async fn get_user(&self, user_id: Uuid) -> Result<User, DbError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, username, password_hash, cash, created_at FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::RowNotFound = e {
                DbError::NotFound
            } else {
                e.into()
            }
        })?;

        Ok(user)
    }

    /// Fetches a user by username, for login. Returns `None` when the
    /// username is unknown so the caller can collapse it into a generic
    /// invalid-credentials failure.
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, username, password_hash, cash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    // ==========================================================================
    // Holdings & trade log (reads)
    // ==========================================================================

    /// Fetches all holdings for a user, ordered by symbol for stable display.
    pub async fn holdings_for_user(&self, user_id: Uuid) -> Result<Vec<Holding>, DbError> {
        let holdings = sqlx::query_as::<_, Holding>(
            "SELECT user_id, symbol, quantity FROM holdings WHERE user_id = $1 ORDER BY symbol ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(holdings)
    }

    /// Fetches the quantity a user holds of one symbol, if any.
    pub async fn holding_quantity(
        &self,
        user_id: Uuid,
        symbol: &str,
    ) -> Result<Option<i64>, DbError> {
        let quantity = sqlx::query_scalar::<_, i64>(
            "SELECT quantity FROM holdings WHERE user_id = $1 AND symbol = $2",
        )
        .bind(user_id)
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quantity)
    }

    /// Fetches the full trade log for a user, newest first.
    pub async fn trades_for_user(&self, user_id: Uuid) -> Result<Vec<TradeRecord>, DbError> {
        let trades = sqlx::query_as::<_, TradeRecord>(
            r#"
            SELECT trade_id, user_id, symbol, shares, total, side, executed_at
            FROM trades
            WHERE user_id = $1
            ORDER BY executed_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(trades)
    }

    // ==========================================================================
    // Ledger mutations
    // ==========================================================================

    /// Executes a buy as one atomic transaction: debit cash, upsert the
    /// holding, append the trade row. Returns the new cash balance.
    ///
    /// The user row is locked for the duration so a concurrent trade from the
    /// same account cannot drive the balance negative between check and debit.
    pub async fn execute_buy(
        &self,
        user_id: Uuid,
        symbol: &str,
        shares: i64,
        total: Decimal,
    ) -> Result<Decimal, DbError> {
        let mut tx = self.pool.begin().await?;

        let cash = sqlx::query_scalar::<_, Decimal>(
            "SELECT cash FROM users WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        if cash < total {
            // Dropping the transaction rolls it back.
            return Err(DbError::InsufficientCash);
        }
        let new_cash = cash - total;

        sqlx::query("UPDATE users SET cash = $1 WHERE user_id = $2")
            .bind(new_cash)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO holdings (user_id, symbol, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, symbol)
            DO UPDATE SET quantity = holdings.quantity + EXCLUDED.quantity
            "#,
        )
        .bind(user_id)
        .bind(symbol)
        .bind(shares)
        .execute(&mut *tx)
        .await?;

        self.append_trade(&mut tx, user_id, symbol, shares, total, TradeSide::Buy)
            .await?;

        tx.commit().await?;
        Ok(new_cash)
    }

    /// Executes a sell as one atomic transaction: decrement or remove the
    /// holding, credit cash, append the trade row. Returns the new cash balance.
    ///
    /// Lock order is users row first, then the holdings row, same as
    /// `execute_buy`, so concurrent trades on one account cannot deadlock.
    pub async fn execute_sell(
        &self,
        user_id: Uuid,
        symbol: &str,
        shares: i64,
        total: Decimal,
    ) -> Result<Decimal, DbError> {
        let mut tx = self.pool.begin().await?;

        let cash = sqlx::query_scalar::<_, Decimal>(
            "SELECT cash FROM users WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        let held = sqlx::query_scalar::<_, i64>(
            "SELECT quantity FROM holdings WHERE user_id = $1 AND symbol = $2 FOR UPDATE",
        )
        .bind(user_id)
        .bind(symbol)
        .fetch_optional(&mut *tx)
        .await?
        .unwrap_or(0);

        if held < shares {
            return Err(DbError::InsufficientShares);
        }

        if held == shares {
            // The schema forbids zero-quantity rows: delete instead.
            sqlx::query("DELETE FROM holdings WHERE user_id = $1 AND symbol = $2")
                .bind(user_id)
                .bind(symbol)
                .execute(&mut *tx)
                .await?;
        } else {
            sqlx::query(
                "UPDATE holdings SET quantity = quantity - $1 WHERE user_id = $2 AND symbol = $3",
            )
            .bind(shares)
            .bind(user_id)
            .bind(symbol)
            .execute(&mut *tx)
            .await?;
        }

        let new_cash = cash + total;
        sqlx::query("UPDATE users SET cash = $1 WHERE user_id = $2")
            .bind(new_cash)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        self.append_trade(&mut tx, user_id, symbol, shares, total, TradeSide::Sell)
            .await?;

        tx.commit().await?;
        Ok(new_cash)
    }

    async fn append_trade(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
        symbol: &str,
        shares: i64,
        total: Decimal,
        side: TradeSide,
    ) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO trades (trade_id, user_id, symbol, shares, total, side, executed_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(symbol)
        .bind(shares)
        .bind(total)
        .bind(side.as_str())
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    // ==========================================================================
    // Sessions
    // ==========================================================================

    /// Creates a session row with a fresh opaque token and the given lifetime.
    pub async fn create_session(
        &self,
        user_id: Uuid,
        ttl: Duration,
    ) -> Result<SessionRecord, DbError> {
        let now = Utc::now();
        let session = sqlx::query_as::<_, SessionRecord>(
            r#"
            INSERT INTO sessions (token, user_id, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING token, user_id, created_at, expires_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(now)
        .bind(now + ttl)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// Looks up a session by token. Expired sessions are treated as absent
    /// and removed lazily on the way out.
    pub async fn get_session(&self, token: Uuid) -> Result<Option<SessionRecord>, DbError> {
        let session = sqlx::query_as::<_, SessionRecord>(
            "SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        match session {
            Some(s) if s.is_expired(Utc::now()) => {
                self.delete_session(token).await?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Deletes a session row. Deleting a token that does not exist is a no-op.
    pub async fn delete_session(&self, token: Uuid) -> Result<(), DbError> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
