//! Refresh-token cookie
//!
//! The refresh token travels in an http-only, same-site strict cookie in
//! addition to the JSON body.

use axum::http::{header, HeaderMap};

/// Cookie name carrying the refresh token
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Refresh cookie attributes
#[derive(Debug, Clone)]
pub struct RefreshCookie {
    /// Only sent over HTTPS (production)
    pub secure: bool,
    pub max_age_secs: u64,
}

impl RefreshCookie {
    pub fn new(secure: bool, max_age_secs: u64) -> Self {
        Self {
            secure,
            max_age_secs,
        }
    }

    /// `Set-Cookie` value carrying a token
    pub fn set(&self, token: &str) -> String {
        let mut cookie = format!("{REFRESH_COOKIE}={token}; HttpOnly; SameSite=Strict; Path=/");
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; Max-Age={}", self.max_age_secs));
        cookie
    }

    /// `Set-Cookie` value expiring the cookie
    pub fn clear(&self) -> String {
        let mut cookie = format!("{REFRESH_COOKIE}=; HttpOnly; SameSite=Strict; Path=/");
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str("; Max-Age=0");
        cookie
    }
}

/// Read a cookie value from request headers
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
}
