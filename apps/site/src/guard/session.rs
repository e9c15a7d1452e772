//! Admin session handling.
//!
//! The session token is read once at the request boundary and passed to the
//! guard functions explicitly, so the checks themselves have no hidden I/O.
//! Expiry lives in the cookie's `Max-Age`; the token carries no structure.

use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::guard::secret::is_key_valid;
use crate::guard::GuardError;

pub const ADMIN_SESSION_COOKIE: &str = "admin_session";
pub const ADMIN_SESSION_MAX_AGE_HOURS: i64 = 8;

/// Raw value of the admin session cookie, if the request carried one.
#[derive(Debug, Clone, Default)]
pub struct SessionToken(Option<String>);

impl SessionToken {
    #[cfg(test)]
    pub fn new(value: Option<String>) -> Self {
        Self(value)
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(SessionToken(
            jar.get(ADMIN_SESSION_COOKIE)
                .map(|c| c.value().to_string()),
        ))
    }
}

/// Read-only session check.
pub fn get_session(token: &SessionToken, admin_key: Option<&str>) -> bool {
    is_key_valid(admin_key, token.as_deref())
}

pub fn assert_session(token: &SessionToken, admin_key: Option<&str>) -> Result<(), GuardError> {
    if get_session(token, admin_key) {
        Ok(())
    } else {
        Err(GuardError::Unauthorized)
    }
}

/// Cookie issued at login. Its value is the admin key itself.
pub fn login_cookie(key: String, secure: bool) -> Cookie<'static> {
    Cookie::build((ADMIN_SESSION_COOKIE, key))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::hours(ADMIN_SESSION_MAX_AGE_HOURS))
        .build()
}

/// Expired cookie that makes the browser drop the session.
pub fn logout_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((ADMIN_SESSION_COOKIE, String::new()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::ZERO)
        .build()
}
