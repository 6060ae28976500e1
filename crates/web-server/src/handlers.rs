use crate::{
    AppState,
    error::AppError,
    session::{CurrentUser, SESSION_COOKIE, clear_session_cookie, session_cookie},
};
use axum::{
    Json,
    extract::{Form, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use core_types::Quote;
use ledger::{PortfolioView, TradeReceipt, TradeView};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

// ==========================================================================
// Request / response payloads
// ==========================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirmation: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Trade forms arrive as strings; `shares` is coerced to a positive integer
/// here at the boundary.
#[derive(Debug, Deserialize)]
pub struct TradeForm {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub shares: String,
}

#[derive(Debug, Deserialize)]
pub struct QuoteParams {
    #[serde(default)]
    pub symbol: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl TradeForm {
    fn parsed_shares(&self) -> Result<i64, AppError> {
        self.shares
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::Validation("Shares must be a positive whole number.".to_string()))
    }
}

// ==========================================================================
// Auth
// ==========================================================================

/// # POST /register
/// Creates an account and logs it straight in.
pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<impl IntoResponse, AppError> {
    let session = state
        .auth
        .register(&form.username, &form.password, &form.confirmation)
        .await?;

    let jar = jar.add(session_cookie(session.token));
    let body = Json(SessionResponse {
        user_id: session.user_id,
        expires_at: session.expires_at,
    });
    Ok((StatusCode::CREATED, jar, body))
}

/// # POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.auth.login(&form.username, &form.password).await?;

    let jar = jar.add(session_cookie(session.token));
    let body = Json(SessionResponse {
        user_id: session.user_id,
        expires_at: session.expires_at,
    });
    Ok((jar, body))
}

/// # POST /logout
/// Clears the session. A request without a (valid) session cookie is a no-op.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    if let Some(token) = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
    {
        state.auth.logout(token).await?;
    }

    let jar = jar.remove(clear_session_cookie());
    Ok((jar, Json(json!({ "status": "logged out" }))))
}

// ==========================================================================
// Ledger
// ==========================================================================

/// # GET /
/// The portfolio view: cash, every holding priced at the current quote, and
/// the grand total.
pub async fn index(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<PortfolioView>, AppError> {
    let portfolio = state.ledger.valuation(user.user_id).await?;
    Ok(Json(portfolio))
}

/// # POST /buy
pub async fn buy(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Form(form): Form<TradeForm>,
) -> Result<Json<TradeReceipt>, AppError> {
    let shares = form.parsed_shares()?;
    let receipt = state.ledger.buy(user.user_id, &form.symbol, shares).await?;
    Ok(Json(receipt))
}

/// # POST /sell
pub async fn sell(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Form(form): Form<TradeForm>,
) -> Result<Json<TradeReceipt>, AppError> {
    let shares = form.parsed_shares()?;
    let receipt = state.ledger.sell(user.user_id, &form.symbol, shares).await?;
    Ok(Json(receipt))
}

/// # GET /quote?symbol=…
pub async fn quote(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Query(params): Query<QuoteParams>,
) -> Result<Json<Quote>, AppError> {
    let quote = state.ledger.quote(&params.symbol).await?;
    Ok(Json(quote))
}

/// # POST /quote
/// Same lookup, fed from a form body instead of the query string.
pub async fn quote_form(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Form(params): Form<QuoteParams>,
) -> Result<Json<Quote>, AppError> {
    let quote = state.ledger.quote(&params.symbol).await?;
    Ok(Json(quote))
}

/// # GET /history
/// The full trade log for the session user, newest first.
pub async fn history(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<Vec<TradeView>>, AppError> {
    let trades = state.ledger.history(user.user_id).await?;
    Ok(Json(trades))
}
