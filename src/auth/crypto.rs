//! Ethereum signature recovery
//!
//! Recovers the signing address from `personal_sign` (EIP-191) signatures
//! produced by Ethereum wallets.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// Errors that can occur during signature recovery
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid signature format: {0}")]
    InvalidSignatureFormat(String),

    #[error("Signature recovery failed")]
    RecoveryFailed,
}

/// Check whether a string is a syntactically valid Ethereum address
/// (`0x` followed by 40 hex digits).
pub fn is_valid_address(address: &str) -> bool {
    let Some(body) = address.strip_prefix("0x") else {
        return false;
    };
    body.len() == 40 && body.chars().all(|c| c.is_ascii_hexdigit())
}

/// Compute the EIP-191 `personal_sign` digest of a message.
///
/// Wallets sign `keccak256("\x19Ethereum Signed Message:\n" + len + message)`,
/// where `len` is the byte length of the message in decimal.
pub fn personal_sign_digest(message: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(b"\x19Ethereum Signed Message:\n");
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message.as_bytes());
    hasher.finalize().into()
}

/// Recover the signer's address from a `personal_sign` signature
///
/// # Arguments
/// * `message` - The exact message text that was signed
/// * `signature_hex` - 65-byte r||s||v signature, hex-encoded with optional 0x prefix
///
/// # Returns
/// The recovered address, lowercased 0x-hex.
pub fn recover_address(message: &str, signature_hex: &str) -> Result<String, CryptoError> {
    let raw = hex::decode(signature_hex.trim_start_matches("0x"))
        .map_err(|e| CryptoError::InvalidSignatureFormat(e.to_string()))?;

    if raw.len() != 65 {
        return Err(CryptoError::InvalidSignatureFormat(format!(
            "Expected 65 bytes, got {}",
            raw.len()
        )));
    }

    // Wallets emit v as 27/28; raw recovery ids are 0/1
    let v = match raw[64] {
        v @ 0..=1 => v,
        v @ 27..=28 => v - 27,
        v => {
            return Err(CryptoError::InvalidSignatureFormat(format!(
                "Invalid recovery id: {}",
                v
            )))
        }
    };

    let mut signature = Signature::from_slice(&raw[..64])
        .map_err(|e| CryptoError::InvalidSignatureFormat(e.to_string()))?;
    let mut recovery_id = RecoveryId::from_byte(v).ok_or(CryptoError::RecoveryFailed)?;

    // Accept high-s signatures by normalizing; normalization flips the parity bit
    if let Some(normalized) = signature.normalize_s() {
        signature = normalized;
        recovery_id =
            RecoveryId::from_byte(recovery_id.to_byte() ^ 1).ok_or(CryptoError::RecoveryFailed)?;
    }

    let digest = personal_sign_digest(message);
    let verifying_key = VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id)
        .map_err(|_| CryptoError::RecoveryFailed)?;

    Ok(ethereum_address(&verifying_key))
}

/// Derive the Ethereum address for a public key: the last 20 bytes of the
/// Keccak-256 hash of the uncompressed point, lowercased 0x-hex.
pub fn ethereum_address(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 uncompressed-point tag
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    format!("0x{}", hex::encode(&hash[12..]))
}
