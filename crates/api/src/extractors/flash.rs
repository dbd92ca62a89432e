//! Pending flash message extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

use crate::services::flash::{read_flash, FlashMessage};

/// Flash message left by the previous redirect, if any.
#[derive(Debug, Clone, Default)]
pub struct Flash(pub Option<FlashMessage>);

#[async_trait]
impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Flash(read_flash(&parts.headers)))
    }
}
