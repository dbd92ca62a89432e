//! One-shot flash messages carried in a cookie.
//!
//! A mutation redirects to the device list with a `flash` cookie; the list
//! page renders the message and clears the cookie. The cookie value is
//! base64url of `level:message` so arbitrary text survives cookie syntax.

use axum::http::{
    header::{COOKIE, LOCATION, SET_COOKIE},
    HeaderMap, StatusCode,
};
use axum::response::{IntoResponse, Response};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

/// Name of the flash cookie.
pub const FLASH_COOKIE: &str = "flash";

/// Severity of a flash message, used as the alert style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Danger,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Danger => "danger",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(Self::Success),
            "danger" => Some(Self::Danger),
            _ => None,
        }
    }
}

/// A user-facing message shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

impl FlashMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Danger,
            message: message.into(),
        }
    }

    /// Cookie-safe encoding of the message.
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{}:{}", self.level.as_str(), self.message))
    }

    /// Decodes a cookie value. Tampered or malformed values yield `None`.
    pub fn decode(value: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
        let text = String::from_utf8(bytes).ok()?;
        let (level, message) = text.split_once(':')?;
        Some(Self {
            level: FlashLevel::parse(level)?,
            message: message.to_string(),
        })
    }

    /// Set-Cookie header value carrying this message.
    pub fn set_cookie(&self) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            FLASH_COOKIE,
            self.encode()
        )
    }
}

/// Set-Cookie header value that removes the flash cookie.
pub fn clear_cookie() -> String {
    format!(
        "{}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax",
        FLASH_COOKIE
    )
}

/// Extract a cookie value from request headers by name.
pub fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|cookie_header| cookie_header.split(';'))
        .map(str::trim)
        .find_map(|cookie| {
            let (cookie_name, cookie_value) = cookie.split_once('=')?;
            (cookie_name == name).then_some(cookie_value)
        })
}

/// Reads the pending flash message from the request, if any.
pub fn read_flash(headers: &HeaderMap) -> Option<FlashMessage> {
    extract_cookie(headers, FLASH_COOKIE)
        .filter(|v| !v.is_empty())
        .and_then(FlashMessage::decode)
}

/// 303 redirect that leaves a flash message for the target page.
pub fn redirect_with_flash(location: &str, flash: &FlashMessage) -> Response {
    (
        StatusCode::SEE_OTHER,
        [
            (LOCATION, location.to_string()),
            (SET_COOKIE, flash.set_cookie()),
        ],
    )
        .into_response()
}
