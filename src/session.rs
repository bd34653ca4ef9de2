//! Session state — cookie jar and auth token.
//!
//! DESIGN
//! ======
//! One `Session` is owned by one client. The jar is an ordered list unique by
//! key: merged cookies replace earlier entries with the same key and move to
//! the end. `loginToken` is a stale login artifact and never survives a merge.
//!
//! Wire forms:
//! - `Cookie` request header: `k1=v1;k2=v2`
//! - `set-cookie` response header: first `;` segment, trimmed, split on the
//!   first `=`

use serde::Serialize;

pub const DEFAULT_COOKIE_KEY: &str = "about_cookie_usage";
pub const DEFAULT_COOKIE_VALUE: &str = "true";
const STALE_LOGIN_COOKIE: &str = "loginToken";

// =============================================================================
// COOKIE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cookie {
    pub key: String,
    pub value: String,
}

impl Cookie {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }

    /// The consent cookie every fresh session starts with.
    #[must_use]
    pub fn consent() -> Self {
        Self::new(DEFAULT_COOKIE_KEY, DEFAULT_COOKIE_VALUE)
    }

    /// Parse one `set-cookie` header value. Attributes after the first `;`
    /// are ignored; a pair without `=` yields an empty value.
    #[must_use]
    pub fn parse_set_cookie(header: &str) -> Option<Self> {
        let pair = header.split(';').next().unwrap_or_default().trim();
        if pair.is_empty() {
            return None;
        }
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        Some(Self::new(key.trim(), value.trim()))
    }
}

/// Encode a jar as a `Cookie` header value.
#[must_use]
pub fn encode_cookie_header(cookies: &[Cookie]) -> String {
    cookies
        .iter()
        .map(|c| format!("{}={}", c.key, c.value))
        .collect::<Vec<_>>()
        .join(";")
}

/// Decode a list of `set-cookie` header values, skipping blank entries.
#[must_use]
pub fn parse_set_cookies<S: AsRef<str>>(headers: &[S]) -> Vec<Cookie> {
    headers
        .iter()
        .filter_map(|h| Cookie::parse_set_cookie(h.as_ref()))
        .collect()
}

// =============================================================================
// SESSION
// =============================================================================

/// Token and cookies as returned by `login` and `logout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub token: String,
    pub cookies: Vec<Cookie>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    cookies: Vec<Cookie>,
    token: String,
}

impl Default for Session {
    fn default() -> Self {
        Self { cookies: vec![Cookie::consent()], token: String::new() }
    }
}

impl Session {
    #[must_use]
    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    #[must_use]
    pub fn cookie_header(&self) -> String {
        encode_cookie_header(&self.cookies)
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot { token: self.token.clone(), cookies: self.cookies.clone() }
    }

    /// Drop the token and replace the jar with the default consent cookie.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
    }

    /// Append `incoming`, replacing same-key entries, then purge `loginToken`.
    pub fn merge_cookies(&mut self, incoming: Vec<Cookie>) {
        for cookie in incoming {
            self.cookies.retain(|c| c.key != cookie.key);
            self.cookies.push(cookie);
        }
        self.cookies.retain(|c| c.key != STALE_LOGIN_COOKIE);
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
