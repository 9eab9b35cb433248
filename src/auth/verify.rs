//! Ethereum `personal_sign` (EIP-191) signature recovery.

use crate::models::Address;
use alloy_primitives::Signature;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Malformed signature: {0}")]
    Malformed(String),

    #[error("Signature recovery failed: {0}")]
    Recovery(String),

    #[error("Recovered address {recovered} does not match claimed address {claimed}")]
    AddressMismatch { claimed: Address, recovered: Address },
}

/// Recover the address that signed `message`.
///
/// `signature_hex` is the 65-byte `r || s || v` signature, hex encoded with
/// or without a `0x` prefix. `v` may be 0/1 or 27/28.
pub fn recover_signer(message: &str, signature_hex: &str) -> Result<Address, VerificationError> {
    let raw = signature_hex
        .trim()
        .strip_prefix("0x")
        .unwrap_or(signature_hex.trim());
    let bytes = hex::decode(raw)
        .map_err(|e| VerificationError::Malformed(format!("invalid hex: {}", e)))?;
    if bytes.len() != 65 {
        return Err(VerificationError::Malformed(format!(
            "expected 65 bytes, got {}",
            bytes.len()
        )));
    }

    let signature =
        Signature::from_raw(&bytes).map_err(|e| VerificationError::Malformed(e.to_string()))?;

    let recovered = signature
        .recover_address_from_msg(message.as_bytes())
        .map_err(|e| VerificationError::Recovery(e.to_string()))?;

    Ok(Address::new(format!("0x{}", hex::encode(recovered.as_slice()))))
}

/// Verify that `claimed` signed `message`.
///
/// Returns the recovered (normalized) address on success.
pub fn verify_signature(
    claimed: &Address,
    message: &str,
    signature_hex: &str,
) -> Result<Address, VerificationError> {
    let recovered = recover_signer(message, signature_hex)?;
    if &recovered != claimed {
        return Err(VerificationError::AddressMismatch {
            claimed: claimed.clone(),
            recovered,
        });
    }
    Ok(recovered)
}
