//! Response header post-processing for encrypted passthrough requests.
//!
//! # Responsibilities
//! - Flag every `Set-Cookie` entry as `secure`
//! - Compose and set `Strict-Transport-Security`
//!
//! # Design Decisions
//! - Operates in place on the outgoing `HeaderMap`
//! - Values that are not valid UTF-8 are left untouched

use std::borrow::Cow;

use axum::http::{
    header::{SET_COOKIE, STRICT_TRANSPORT_SECURITY},
    HeaderMap, HeaderValue,
};

/// `Strict-Transport-Security` policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HstsPolicy {
    /// `max-age` in seconds.
    pub expires: u64,
    pub subdomains: bool,
    pub preload: bool,
}

impl Default for HstsPolicy {
    fn default() -> Self {
        Self {
            expires: 31_536_000,
            subdomains: true,
            preload: false,
        }
    }
}

impl HstsPolicy {
    pub fn header_value(&self) -> String {
        let mut value = format!("max-age={}", self.expires);
        if self.subdomains {
            value.push_str("; includeSubDomains");
        }
        if self.preload {
            value.push_str("; preload");
        }
        value
    }
}

/// Append `; secure` to every cookie that lacks it.
pub fn secure_cookies(headers: &mut HeaderMap) {
    let cookies: Vec<HeaderValue> = headers.get_all(SET_COOKIE).iter().cloned().collect();
    if cookies.is_empty() {
        return;
    }

    headers.remove(SET_COOKIE);
    for value in cookies {
        let secured = value
            .to_str()
            .ok()
            .map(secure_cookie_lines)
            .and_then(|s| HeaderValue::from_str(&s).ok());
        headers.append(SET_COOKIE, secured.unwrap_or(value));
    }
}

// `HeaderValue` rejects newlines, so through `secure_cookies` this sees one
// cookie; the split covers values joined with `\n` outside a `HeaderMap`.
fn secure_cookie_lines(value: &str) -> String {
    value
        .split('\n')
        .map(secure_cookie)
        .collect::<Vec<_>>()
        .join("\n")
}

fn secure_cookie(cookie: &str) -> Cow<'_, str> {
    if cookie.trim().is_empty() || has_secure_flag(cookie) {
        Cow::Borrowed(cookie)
    } else {
        Cow::Owned(format!("{}; secure", cookie))
    }
}

// Attribute names are matched case-sensitively.
fn has_secure_flag(cookie: &str) -> bool {
    cookie.split(';').skip(1).any(|attr| attr.trim() == "secure")
}

/// Set `Strict-Transport-Security`, replacing any value set upstream.
pub fn apply_hsts(headers: &mut HeaderMap, policy: &HstsPolicy) {
    if let Ok(value) = HeaderValue::from_str(&policy.header_value()) {
        headers.insert(STRICT_TRANSPORT_SECURITY, value);
    }
}
