//! The refresh-token cookie.
//!
//! The refresh token travels in an `HttpOnly` cookie whose `Max-Age` matches
//! the token lifetime. Clearing it sends an empty value with `Max-Age=0`.

use axum::http::header::{InvalidHeaderValue, COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use cookie::time::Duration as CookieDuration;
use cookie::{Cookie, SameSite};

use crate::config::CookieConfig;

/// Build the `Set-Cookie` value carrying a refresh token.
pub fn refresh_cookie(
    config: &CookieConfig,
    token: &str,
    max_age_secs: i64,
) -> Result<HeaderValue, InvalidHeaderValue> {
    build(config, token, max_age_secs)
}

/// Build the `Set-Cookie` value that deletes the refresh-token cookie.
pub fn clear_refresh_cookie(config: &CookieConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    build(config, "", 0)
}

/// Extract the refresh token from the request's `Cookie` headers.
pub fn refresh_token_from_headers(headers: &HeaderMap, config: &CookieConfig) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == config.refresh_cookie_name && !c.value().is_empty())
        .map(|c| c.value().to_string())
}

fn build(
    config: &CookieConfig,
    value: &str,
    max_age_secs: i64,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let cookie = Cookie::build((config.refresh_cookie_name.clone(), value.to_string()))
        .http_only(true)
        .secure(config.secure)
        .same_site(config.same_site)
        .max_age(CookieDuration::seconds(max_age_secs))
        .path("/")
        .build();
    HeaderValue::from_str(&cookie.to_string())
}

/// Parse a `COOKIE_SAMESITE` value.
pub fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.trim().to_ascii_lowercase().as_str() {
        "none" => Some(SameSite::None),
        "lax" => Some(SameSite::Lax),
        "strict" => Some(SameSite::Strict),
        _ => None,
    }
}
