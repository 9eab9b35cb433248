//! Error types and Axum response conversions.

use crate::auth::protocol::AuthFailure;
use crate::campaign::CampaignError;
use crate::storage::campaign::RepositoryError;
use crate::storage::StoreError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Message returned to callers when the token/nonce store is unreachable.
pub const STORE_UNAVAILABLE_MESSAGE: &str =
    "Session store unavailable; check key-value store connectivity and configuration";

/// Application error types.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Internal error: {0}")]
    Internal(String),

    /// Credential or nonce store failure. Detail is logged, never returned.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Authentication failed: {0}")]
    Authentication(AuthFailure),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Campaign rule violation. Shares the generic failure status but keeps
    /// its message.
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, reason) = match &self {
            AppError::Internal(msg) => {
                // Log detailed error server-side, return generic message to client
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::Store(msg) => {
                tracing::error!(error = %msg, "Key-value store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    STORE_UNAVAILABLE_MESSAGE.to_string(),
                    None,
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            AppError::Authentication(failure) => (
                StatusCode::UNAUTHORIZED,
                failure.to_string(),
                Some(failure.reason()),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Conflict(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), None),
        };

        let body = match reason {
            Some(reason) => Json(json!({
                "error": message,
                "reason": reason
            })),
            None => Json(json!({
                "error": message
            })),
        };

        (status, body).into_response()
    }
}

// Convenience conversions from common error types
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err.to_string())
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Internal(format!("Campaign document error: {}", err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<AuthFailure> for AppError {
    fn from(failure: AuthFailure) -> Self {
        AppError::Authentication(failure)
    }
}

impl From<CampaignError> for AppError {
    fn from(err: CampaignError) -> Self {
        match err {
            CampaignError::Validation(msg) => AppError::BadRequest(msg),
            CampaignError::NotFound(_) => AppError::NotFound(err.to_string()),
            CampaignError::DuplicateId(_)
            | CampaignError::InvalidTransition(_)
            | CampaignError::AlreadyStarted(_)
            | CampaignError::CannotDelete(_) => AppError::Conflict(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    /// Extract status code and JSON body from an AppError response.
    async fn error_response(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn test_internal_hides_details() {
        let (status, body) = error_response(AppError::Internal(
            "failed to parse /srv/data/campaigns.toml at line 3".to_string(),
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert!(!body["error"].as_str().unwrap().contains("/srv"));
    }

    #[tokio::test]
    async fn test_store_error_is_sanitized() {
        let (status, body) = error_response(AppError::Store(
            "Redis connection refused at 10.0.0.5:6379".to_string(),
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], STORE_UNAVAILABLE_MESSAGE);
        assert!(!body["error"].as_str().unwrap().contains("10.0.0.5"));
    }

    #[tokio::test]
    async fn test_bad_request() {
        let (status, body) =
            error_response(AppError::BadRequest("Invalid format".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid format");
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let (status, body) =
            error_response(AppError::Unauthorized("Unauthorized".to_string())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");
        assert!(body.get("reason").is_none());
    }

    #[tokio::test]
    async fn test_authentication_failure_carries_reason() {
        let (status, body) =
            error_response(AppError::Authentication(AuthFailure::SignatureAlreadyUsed)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["reason"], "signature_already_used");
        assert_eq!(body["error"], AuthFailure::SignatureAlreadyUsed.to_string());
    }

    #[tokio::test]
    async fn test_not_found() {
        let (status, body) =
            error_response(AppError::NotFound("Campaign not found".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Campaign not found");
    }

    #[tokio::test]
    async fn test_conflict_keeps_message() {
        let err = AppError::from(CampaignError::DuplicateId("c1".to_string()));
        let (status, body) = error_response(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("c1"));
    }

    #[test]
    fn test_campaign_error_mapping() {
        assert!(matches!(
            AppError::from(CampaignError::Validation("bad".to_string())),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from(CampaignError::NotFound("c9".to_string())),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(CampaignError::CannotDelete("c1".to_string())),
            AppError::Conflict(_)
        ));
    }

    #[test]
    fn test_from_store_error() {
        let redis_err = redis::RedisError::from((
            redis::ErrorKind::IoError,
            "test context",
            "connection refused".to_string(),
        ));
        let app_err = AppError::from(StoreError::from(redis_err));
        match app_err {
            AppError::Store(msg) => assert!(msg.contains("connection refused")),
            _ => panic!("Expected Store variant"),
        }
    }
}
