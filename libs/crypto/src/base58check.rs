//! `Base58Check` encoding/decoding for Tezos
//!
//! Tezos uses a custom base58check format similar to Bitcoin's,
//! but with specific prefixes for different key and hash types.

use crate::error::{CryptoError, Result};
use sha2::{Digest, Sha256};

/// Encode data with base58check (double SHA256 checksum)
#[must_use]
pub fn encode(prefix: &[u8], data: &[u8]) -> String {
    let mut payload = Vec::with_capacity(prefix.len() + data.len() + 4);
    payload.extend_from_slice(prefix);
    payload.extend_from_slice(data);

    let checksum = compute_checksum(&payload);
    payload.extend_from_slice(&checksum[..4]);

    bs58::encode(&payload).into_string()
}

/// Decode base58check encoded string, verify and strip `prefix`
pub fn decode(s: &str, prefix: &[u8]) -> Result<Vec<u8>> {
    let payload = decode_unchecked_prefix(s)?;

    if payload.len() < prefix.len() || &payload[..prefix.len()] != prefix {
        return Err(CryptoError::Base58("Invalid prefix".to_string()));
    }

    Ok(payload[prefix.len()..].to_vec())
}

/// Decode base58check encoded string, verify the checksum and return
/// the payload including its (unknown) prefix
pub fn decode_unchecked_prefix(s: &str) -> Result<Vec<u8>> {
    let decoded = bs58::decode(s)
        .into_vec()
        .map_err(|e| CryptoError::Base58(format!("{e}")))?;

    if decoded.len() < 4 {
        return Err(CryptoError::Base58("Invalid length".to_string()));
    }

    let data_end = decoded.len() - 4;
    let checksum = &decoded[data_end..];
    let computed_checksum = compute_checksum(&decoded[..data_end]);
    if checksum != &computed_checksum[..4] {
        return Err(CryptoError::Base58("Invalid checksum".to_string()));
    }

    Ok(decoded[..data_end].to_vec())
}

/// Compute double SHA256 checksum (first 4 bytes are used)
fn compute_checksum(data: &[u8]) -> [u8; 32] {
    let first_hash = Sha256::digest(data);
    let second_hash = Sha256::digest(first_hash);
    let mut checksum = [0u8; 32];
    checksum.copy_from_slice(&second_hash);
    checksum
}
