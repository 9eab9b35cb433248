//! Auth API endpoint.

use crate::auth::middleware::AppState;
use crate::auth::protocol::AuthError;
use crate::error::AppError;
use crate::models::{Address, AuthRequest, AuthResponse};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Missing required field: {}", field)))
}

/// POST /auth — Exchange a signed message for a session token
pub async fn authenticate(
    State(state): State<AppState>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let address = Address::new(required(req.address, "address")?);
    let message = required(req.message, "message")?;
    let signature = required(req.signature, "signature")?;

    let result = state
        .auth
        .authenticate(&state.config.allowlist, &address, &message, &signature)
        .await;

    match result {
        Ok(auth) => {
            tracing::info!(action = "auth_success", address = %auth.address, "Address authenticated");
            Ok(Json(AuthResponse {
                token: auth.token,
                address: auth.address.to_string(),
            }))
        }
        Err(AuthError::Rejected(failure)) => {
            tracing::warn!(
                action = "auth_failed",
                address = %address,
                reason = failure.reason(),
                "Authentication rejected"
            );
            Err(failure.into())
        }
        Err(AuthError::Issue(e)) => Err(e.into()),
    }
}
