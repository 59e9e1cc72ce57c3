//! Session cookie helpers.

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};

/// Name of the session cookie.
pub const AUTH_COOKIE: &str = "auth_token";

/// Cookie attributes for the session cookie.
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    /// Adds the `Secure` attribute.
    pub secure: bool,
    /// Lifetime in seconds.
    pub max_age_secs: u64,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: false,
            max_age_secs: 30 * 24 * 60 * 60,
        }
    }
}

/// Returns the value of cookie `name`, if the request carries it.
pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// Builds the `Set-Cookie` value carrying a session token.
pub fn session_cookie(token: &str, settings: CookieSettings) -> Option<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        AUTH_COOKIE, token, settings.max_age_secs
    );
    if settings.secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}
