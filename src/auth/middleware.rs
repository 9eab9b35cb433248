//! Axum extractors for authentication.

use crate::auth::protocol::AuthenticationProtocol;
use crate::config::Config;
use crate::error::AppError;
use crate::models::Address;
use crate::storage::{CampaignRepository, KvStore, NonceLedger, TokenStore};
use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: AuthenticationProtocol,
    pub campaigns: CampaignRepository,
}

impl AppState {
    /// Wire the stores from configuration and a key-value backend.
    pub fn new(config: Config, kv: Arc<dyn KvStore>) -> Self {
        let nonces = NonceLedger::new(kv.clone(), config.nonce_ttl_secs);
        let tokens = TokenStore::new(kv, config.session_ttl_secs);
        let campaigns = CampaignRepository::new(
            config.campaigns_storage_path.clone(),
            config.campaigns_document_key.clone(),
        );

        AppState {
            config: Arc::new(config),
            auth: AuthenticationProtocol::new(nonces, tokens),
            campaigns,
        }
    }
}

/// Authenticated session extractor.
///
/// Extracts the token from the `Authorization: Bearer {token}` header and
/// revalidates it against the token store on every request.
/// Returns 401 Unauthorized if missing, unknown, or expired; the response
/// does not say which.
pub struct AuthSession {
    pub address: Address,
    pub token: String,
}

const UNAUTHORIZED: &str = "Unauthorized";

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Extract Authorization header
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized(UNAUTHORIZED.to_string()))?;

        // Parse Bearer token
        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized(UNAUTHORIZED.to_string()))?
            .to_string();

        let address = state
            .auth
            .tokens()
            .validate(&token)
            .await?
            .ok_or_else(|| AppError::Unauthorized(UNAUTHORIZED.to_string()))?;

        Ok(AuthSession { address, token })
    }
}
