//! One-shot notices shown on the next rendered page.
//!
//! Notices are stored as base64url JSON in a cookie, appended to by handlers
//! that redirect and drained by handlers that render.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

/// Name of the notice cookie.
pub const FLASH_COOKIE: &str = "aashray_messages";

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl Level {
    /// Alert class used by the page layout.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "danger",
        }
    }
}

/// A single notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: Level,
    pub text: String,
}

impl Notice {
    pub fn new(level: Level, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Level::Error, text)
    }
}

fn decode(jar: &CookieJar) -> Vec<Notice> {
    jar.get(FLASH_COOKIE)
        .and_then(|c| URL_SAFE_NO_PAD.decode(c.value()).ok())
        .and_then(|raw| serde_json::from_slice(&raw).ok())
        .unwrap_or_default()
}

fn encode(notices: &[Notice]) -> String {
    URL_SAFE_NO_PAD.encode(serde_json::to_vec(notices).unwrap_or_default())
}

/// Queue a notice for the next page.
#[must_use]
pub fn push(jar: CookieJar, level: Level, text: impl Into<String>) -> CookieJar {
    let mut notices = decode(&jar);
    notices.push(Notice::new(level, text));

    let cookie = Cookie::build((FLASH_COOKIE, encode(&notices)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    jar.add(cookie)
}

/// Drain queued notices, clearing the cookie.
#[must_use]
pub fn take(jar: CookieJar) -> (CookieJar, Vec<Notice>) {
    let notices = decode(&jar);
    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, notices);
    }
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), notices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carry(jar: &CookieJar) -> CookieJar {
        // Simulate the browser sending the cookie back.
        let mut next = CookieJar::new();
        if let Some(cookie) = jar.get(FLASH_COOKIE) {
            next = next.add(Cookie::new(FLASH_COOKIE, cookie.value().to_string()));
        }
        next
    }

    #[test]
    fn test_push_then_take() {
        let jar = push(CookieJar::new(), Level::Success, "Saved.");
        let jar = push(carry(&jar), Level::Info, "Twice.");

        let (_, notices) = take(carry(&jar));
        assert_eq!(
            notices,
            vec![
                Notice::new(Level::Success, "Saved."),
                Notice::new(Level::Info, "Twice.")
            ]
        );
    }

    #[test]
    fn test_take_without_cookie() {
        let (_, notices) = take(CookieJar::new());
        assert!(notices.is_empty());
    }

    #[test]
    fn test_garbage_cookie_is_ignored() {
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, "%%%not-base64"));
        let (_, notices) = take(jar);
        assert!(notices.is_empty());
    }

    #[test]
    fn test_error_maps_to_danger() {
        assert_eq!(Level::Error.css_class(), "danger");
    }
}
