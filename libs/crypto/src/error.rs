//! Error type shared by all fixed-width primitives

use thiserror::Error;

/// Errors raised while parsing or producing hashes, addresses, keys and signatures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Base58check decoding failed (bad alphabet, checksum or prefix)
    #[error("Base58 decode error: {0}")]
    Base58(String),

    /// A fixed-width value had the wrong number of bytes
    #[error("Invalid {what} length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Name of the value being decoded
        what: &'static str,
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },

    /// A leading type tag was not recognised
    #[error("Invalid {what} tag: 0x{tag:02X}")]
    InvalidTag {
        /// Name of the value being decoded
        what: &'static str,
        /// The offending tag byte
        tag: u8,
    },

    /// Secret key material was rejected
    #[error("Invalid secret key: {0}")]
    InvalidSecretKey(String),

    /// Public key material was rejected
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Signature material was rejected
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// The key curve is known but cannot be used for this operation
    #[error("Unsupported key type: {0}")]
    UnsupportedKey(&'static str),

    /// Random seed generation failed
    #[error("Key generation error: {0}")]
    KeyGeneration(String),

    /// General signing operation failure
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

/// Result type for primitive operations
pub type Result<T> = std::result::Result<T, CryptoError>;
