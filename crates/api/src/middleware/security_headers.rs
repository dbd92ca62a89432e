//! Security headers middleware.
//!
//! The portal serves server-rendered HTML behind a reverse proxy, so every
//! response forbids framing and sniffing and restricts content to our origin.

use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// Security header names and values.
pub mod headers {
    pub const X_CONTENT_TYPE_OPTIONS: &str = "x-content-type-options";
    pub const X_FRAME_OPTIONS: &str = "x-frame-options";
    pub const REFERRER_POLICY: &str = "referrer-policy";
    pub const CONTENT_SECURITY_POLICY: &str = "content-security-policy";

    pub const CSP_VALUE: &str =
        "default-src 'self'; style-src 'self' 'unsafe-inline'; form-action 'self'; frame-ancestors 'none'";
}

/// Middleware that adds security headers to all responses.
pub async fn security_headers_middleware(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let map = response.headers_mut();

    map.insert(
        header::HeaderName::from_static(headers::X_CONTENT_TYPE_OPTIONS),
        HeaderValue::from_static("nosniff"),
    );
    map.insert(
        header::HeaderName::from_static(headers::X_FRAME_OPTIONS),
        HeaderValue::from_static("DENY"),
    );
    map.insert(
        header::HeaderName::from_static(headers::REFERRER_POLICY),
        HeaderValue::from_static("same-origin"),
    );
    map.insert(
        header::HeaderName::from_static(headers::CONTENT_SECURITY_POLICY),
        HeaderValue::from_static(headers::CSP_VALUE),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_names_are_lowercase() {
        for name in [
            headers::X_CONTENT_TYPE_OPTIONS,
            headers::X_FRAME_OPTIONS,
            headers::REFERRER_POLICY,
            headers::CONTENT_SECURITY_POLICY,
        ] {
            assert!(name.chars().all(|c| c.is_ascii_lowercase() || c == '-'));
        }
    }

    #[test]
    fn test_csp_value_is_valid_header() {
        assert!(HeaderValue::from_str(headers::CSP_VALUE).is_ok());
        assert!(headers::CSP_VALUE.contains("frame-ancestors 'none'"));
    }
}
