//! Trusted-proxy authorization gate.
//!
//! Authentication happens at the reverse proxy, which forwards the user's
//! identity in request headers. This module turns those headers into a
//! [`ProxyIdentity`] and guards routes on two tiers: any authenticated
//! user, and members of the privileged group.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

use crate::app::AppState;
use crate::config::AuthConfig;
use crate::error::ApiError;
use crate::middleware::metrics::record_access_denied;
use crate::middleware::trace_id::get_request_id;

/// Synthetic identity used in development mode when no proxy is in front.
pub const DEV_USER: &str = "dev_user";
pub const DEV_NAME: &str = "Development User (Simulated)";
pub const DEV_GROUPS: &str = "users,sudoers";
pub const DEV_EMAIL: &str = "dev_user@example.com (Simulated)";

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Identity asserted by the upstream proxy for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyIdentity {
    pub user: Option<String>,
    pub name: Option<String>,
    pub groups: Vec<String>,
    pub email: Option<String>,
    /// Raw group header, kept for display and audit.
    pub groups_raw: Option<String>,
    privileged: bool,
    simulated: bool,
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Splits a comma-separated group list, dropping blank entries.
pub fn parse_groups(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

impl ProxyIdentity {
    /// Reads the identity headers named in the auth configuration.
    pub fn from_headers(headers: &HeaderMap, auth: &AuthConfig) -> Self {
        let groups_raw = header_text(headers, &auth.groups_header);
        Self::build(
            header_text(headers, &auth.user_header),
            header_text(headers, &auth.name_header),
            groups_raw,
            header_text(headers, &auth.email_header),
            auth,
            false,
        )
    }

    /// The fixed identity injected in development mode.
    pub fn development(auth: &AuthConfig) -> Self {
        Self::build(
            Some(DEV_USER.to_string()),
            Some(DEV_NAME.to_string()),
            Some(DEV_GROUPS.to_string()),
            Some(DEV_EMAIL.to_string()),
            auth,
            true,
        )
    }

    fn build(
        user: Option<String>,
        name: Option<String>,
        groups_raw: Option<String>,
        email: Option<String>,
        auth: &AuthConfig,
        simulated: bool,
    ) -> Self {
        let groups = groups_raw.as_deref().map(parse_groups).unwrap_or_default();
        let privileged = groups.iter().any(|g| g == &auth.privileged_group);
        Self {
            user,
            name,
            groups,
            email,
            groups_raw,
            privileged,
            simulated,
        }
    }

    /// Resolves the effective identity, applying the development fallback.
    ///
    /// The fallback only fires in development mode and only when the user
    /// header is missing entirely; a present but empty header stays
    /// anonymous.
    pub fn resolve(headers: &HeaderMap, auth: &AuthConfig, path: &str) -> Self {
        if auth.is_development() && !headers.contains_key(auth.user_header.as_str()) {
            tracing::info!(
                path = %path,
                user = DEV_USER,
                "DEV MODE: simulating proxy headers with the development user"
            );
            return Self::development(auth);
        }
        Self::from_headers(headers, auth)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.as_deref().is_some_and(|u| !u.is_empty())
    }

    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    /// Whether this identity came from the development fallback.
    pub fn is_simulated(&self) -> bool {
        self.simulated
    }

    /// User identifier, or "Unknown" for anonymous requests.
    pub fn user_or_unknown(&self) -> &str {
        match self.user.as_deref() {
            Some(u) if !u.is_empty() => u,
            _ => "Unknown",
        }
    }

    /// Display name falling back to the user identifier.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(n) if !n.is_empty() => n,
            _ => self.user_or_unknown(),
        }
    }
}

/// Source address for audit entries: first X-Forwarded-For hop, then the
/// socket peer, then "unknown".
pub fn source_address(req: &Request<Body>) -> String {
    let forwarded = req
        .headers()
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(addr) = forwarded {
        return addr.to_string();
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn deny(req: &Request<Body>, identity: &ProxyIdentity, error: ApiError) -> Response {
    let reason = match &error {
        ApiError::Forbidden(_) => "forbidden",
        _ => "unauthenticated",
    };
    record_access_denied(reason);

    tracing::warn!(
        request_id = %get_request_id(req.extensions()),
        path = %req.uri().path(),
        user = %identity.user_or_unknown(),
        groups = %identity.groups_raw.as_deref().unwrap_or("None"),
        source = %source_address(req),
        reason = reason,
        "Access denied"
    );

    error.into_response()
}

/// Middleware that requires an authenticated user.
///
/// The resolved identity is stored in request extensions for handlers.
pub async fn require_authenticated(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let identity = ProxyIdentity::resolve(req.headers(), &state.config.auth, req.uri().path());

    if !identity.is_authenticated() {
        return deny(
            &req,
            &identity,
            ApiError::Unauthorized("Authentication is required to access this page.".into()),
        );
    }

    req.extensions_mut().insert(identity);
    next.run(req).await
}

/// Middleware that requires a member of the privileged group.
pub async fn require_privileged(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let auth = &state.config.auth;
    let identity = ProxyIdentity::resolve(req.headers(), auth, req.uri().path());

    if !identity.is_authenticated() {
        return deny(
            &req,
            &identity,
            ApiError::Unauthorized("Authentication is required to access this page.".into()),
        );
    }

    if !identity.is_privileged() {
        let message = format!(
            "You do not have sufficient permissions to access this resource. '{}' group membership is required.",
            auth.privileged_group
        );
        return deny(&req, &identity, ApiError::Forbidden(message));
    }

    req.extensions_mut().insert(identity);
    next.run(req).await
}
