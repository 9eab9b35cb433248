//! Wallet-signature authentication flow.
//!
//! Order of checks:
//! 1. derive nonce from (message, signature); reject if already consumed
//! 2. recover signer and compare with the claimed address
//! 3. allowlist membership
//! 4. mark nonce consumed (best effort)
//! 5. issue session token
//!
//! The nonce is only burned after steps 1-3 pass, so a caller who got the
//! claim wrong can retry with the same signed message.

use crate::auth::session::derive_nonce;
use crate::auth::verify::{verify_signature, VerificationError};
use crate::config::Allowlist;
use crate::error::STORE_UNAVAILABLE_MESSAGE;
use crate::models::Address;
use crate::storage::{NonceLedger, StoreError, TokenStore};

/// Why an authentication attempt was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    #[error("Signature already used")]
    SignatureAlreadyUsed,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Address not authorized")]
    AddressNotAuthorized,

    #[error("Verification error: {0}")]
    VerificationError(String),
}

impl AuthFailure {
    /// Stable machine-readable code.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthFailure::SignatureAlreadyUsed => "signature_already_used",
            AuthFailure::InvalidSignature => "invalid_signature",
            AuthFailure::AddressNotAuthorized => "address_not_authorized",
            AuthFailure::VerificationError(_) => "verification_error",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Rejected(#[from] AuthFailure),

    /// Token could not be persisted after a successful verification.
    #[error("Failed to issue session token: {0}")]
    Issue(StoreError),
}

/// Successful authentication.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub token: String,
    pub address: Address,
}

/// Composes signature verification, replay protection, the allowlist, and
/// token issuance.
#[derive(Clone)]
pub struct AuthenticationProtocol {
    nonces: NonceLedger,
    tokens: TokenStore,
}

fn store_failure(err: StoreError) -> AuthFailure {
    tracing::error!(error = %err, "Nonce store lookup failed during authentication");
    AuthFailure::VerificationError(STORE_UNAVAILABLE_MESSAGE.to_string())
}

impl AuthenticationProtocol {
    pub fn new(nonces: NonceLedger, tokens: TokenStore) -> Self {
        AuthenticationProtocol { nonces, tokens }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub async fn authenticate(
        &self,
        allowlist: &Allowlist,
        claimed: &Address,
        message: &str,
        signature: &str,
    ) -> Result<Authenticated, AuthError> {
        let nonce = derive_nonce(message, signature);
        if self.nonces.is_consumed(&nonce).await.map_err(store_failure)? {
            return Err(AuthFailure::SignatureAlreadyUsed.into());
        }

        match verify_signature(claimed, message, signature) {
            Ok(_) => {}
            Err(VerificationError::Malformed(detail)) | Err(VerificationError::Recovery(detail)) => {
                tracing::debug!(detail = %detail, "Signature could not be recovered");
                return Err(AuthFailure::InvalidSignature.into());
            }
            Err(e @ VerificationError::AddressMismatch { .. }) => {
                tracing::debug!(detail = %e, "Signature address mismatch");
                return Err(AuthFailure::InvalidSignature.into());
            }
        }

        if !allowlist.contains(claimed) {
            return Err(AuthFailure::AddressNotAuthorized.into());
        }

        // A failed write is logged and the attempt still succeeds
        if let Err(e) = self.nonces.mark_consumed(&nonce, claimed).await {
            tracing::warn!(
                action = "nonce_mark_failed",
                address = %claimed,
                error = %e,
                "Failed to record consumed nonce; continuing"
            );
        }

        let token = self.tokens.issue(claimed).await.map_err(AuthError::Issue)?;

        Ok(Authenticated {
            token,
            address: claimed.clone(),
        })
    }
}
