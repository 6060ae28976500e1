use crate::{AppState, error::AppError};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use uuid::Uuid;

/// The cookie carrying the opaque session token.
pub const SESSION_COOKIE: &str = "session";

/// The authenticated caller, resolved from the session cookie on extraction.
/// Handlers that take a `CurrentUser` argument reject unauthenticated
/// requests with 401 before any of their own logic runs.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub token: Uuid,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
            .ok_or(AppError::Unauthenticated)?;

        let session = state
            .auth
            .authenticate(token)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        Ok(CurrentUser {
            user_id: session.user_id,
            token,
        })
    }
}

/// Builds the session cookie handed to the browser after login/register.
pub fn session_cookie(token: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// A removal cookie that clears the session from the browser on logout.
pub fn clear_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    cookie
}
