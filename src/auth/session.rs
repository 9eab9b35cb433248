//! Token and nonce generation for authentication.

use crate::models::Address;
use base64::{engine::general_purpose, Engine as _};
use rand::Rng;
use sha2::{Digest, Sha256};

/// Separator placed between message and signature when deriving a nonce.
pub const NONCE_SEPARATOR: &str = ":";

/// Generate a session token bound to `address` at `issued_at`.
///
/// 32 bytes from the OS-seeded CSPRNG are hashed together with the address
/// and issuance time. Returns a base64-encoded string (44 characters).
pub fn generate_session_token(address: &Address, issued_at: i64) -> String {
    let mut rng = rand::rng();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);

    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.update(address.as_str().as_bytes());
    hasher.update(issued_at.to_be_bytes());
    general_purpose::STANDARD.encode(hasher.finalize())
}

/// Derive the one-time-use marker for a signed payload.
///
/// SHA-256 over `message`, separator, `signature`; hex encoded (64 characters).
/// The same pair always yields the same nonce.
pub fn derive_nonce(message: &str, signature: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(message.as_bytes());
    hasher.update(NONCE_SEPARATOR.as_bytes());
    hasher.update(signature.as_bytes());
    hex::encode(hasher.finalize())
}
