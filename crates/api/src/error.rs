use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use domain::services::StoreError;
use thiserror::Error;

use crate::views;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Unauthorized(msg) | ApiError::Forbidden(msg) | ApiError::NotFound(msg) => {
                msg
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred. Please try again later.".to_string()
            }
        };

        (status, Html(views::error_page(status, &message))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(mac) => ApiError::NotFound(format!("Device {} not found.", mac)),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_api_error_statuses() {
        assert_eq!(
            ApiError::Unauthorized("x".into()).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal("x".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_page_is_html() {
        let response = ApiError::Forbidden("sudoers group membership is required".into())
            .into_response();
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("text/html"));

        let body = body_text(response).await;
        assert!(body.contains("403 Forbidden"));
        assert!(body.contains("sudoers group membership is required"));
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response =
            ApiError::Internal("connection refused to 10.0.0.5:5432".into()).into_response();
        let body = body_text(response).await;
        assert!(!body.contains("10.0.0.5"));
        assert!(body.contains("An internal error occurred"));
    }

    #[test]
    fn test_from_store_error() {
        let not_found: ApiError = StoreError::NotFound("aa:bb:cc:dd:ee:ff".into()).into();
        assert!(matches!(not_found, ApiError::NotFound(ref m) if m.contains("aa:bb:cc:dd:ee:ff")));

        let repo: ApiError = StoreError::Repository("boom".into()).into();
        assert_eq!(repo.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            ApiError::NotFound("device".into()).to_string(),
            "Not found: device"
        );
    }
}
