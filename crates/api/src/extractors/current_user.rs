//! Identity extractor for handlers behind the authorization gate.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;
use crate::middleware::proxy_auth::ProxyIdentity;

/// The identity resolved by `require_authenticated` / `require_privileged`.
///
/// Rejects with `Unauthorized` when used on a route without a gate.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub ProxyIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ProxyIdentity>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| ApiError::Unauthorized("Authentication is required.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::http::Request;

    #[tokio::test]
    async fn test_current_user_from_extensions() {
        let auth = Config::load_for_test(&[]).unwrap().auth;
        let mut req = Request::builder().body(()).unwrap();
        req.extensions_mut().insert(ProxyIdentity::development(&auth));
        let (mut parts, _) = req.into_parts();

        let CurrentUser(user) = CurrentUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(user.user.as_deref(), Some("dev_user"));
    }

    #[tokio::test]
    async fn test_current_user_missing() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let result = CurrentUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }
}
