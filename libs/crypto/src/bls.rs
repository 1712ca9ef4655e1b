//! BLS12-381 keys and signatures (`MinPk` variant with proof-of-possession)
//!
//! Ported from: `src/lib_crypto/bls.ml`
//!
//! ## Out-of-range secret keys
//!
//! BLST only accepts secret keys strictly below the scalar field order
//! ```text
//! r = 0x73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000001
//! ```
//! while Octez reduces larger values modulo `r`. Existing key files contain
//! such keys, so [`SecretKey::from_bytes`] falls back to the same reduction
//! when BLST answers `BLST_BAD_ENCODING`.

use crate::error::{CryptoError, Result};
use num_bigint::BigUint;

// Ciphersuite for MinPk.Pop signatures, as used by Tezos
const POP_CIPHERSUITE_ID: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

// Scalar field order, big-endian
const CURVE_ORDER: [u8; 32] = [
    0x73, 0xed, 0xa7, 0x53, 0x29, 0x9d, 0x7d, 0x48, 0x33, 0x39, 0xd8, 0x08, 0x09, 0xa1, 0xd8,
    0x05, 0x53, 0xbd, 0xa4, 0x02, 0xff, 0xfe, 0x5b, 0xfe, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00,
    0x00, 0x01,
];

/// Size of a compressed G1 public key
pub const PUBLIC_KEY_SIZE: usize = 48;
/// Size of a compressed G2 signature
pub const SIGNATURE_SIZE: usize = 96;

/// BLS12-381 secret key (32 bytes, little-endian scalar on disk)
#[derive(Clone)]
pub struct SecretKey {
    sk: blst::min_pk::SecretKey,
}

impl SecretKey {
    /// Size of secret key in bytes
    pub const SIZE: usize = 32;

    /// Create from 32 little-endian bytes, reducing modulo `r` when needed
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::SIZE {
            return Err(CryptoError::InvalidLength {
                what: "BLS secret key",
                expected: Self::SIZE,
                actual: bytes.len(),
            });
        }

        // BLST expects big-endian
        let mut reversed = bytes.to_vec();
        reversed.reverse();

        match blst::min_pk::SecretKey::from_bytes(&reversed) {
            Ok(sk) => Ok(Self { sk }),
            Err(blst::BLST_ERROR::BLST_BAD_ENCODING) => {
                let order = BigUint::from_bytes_be(&CURVE_ORDER);
                let reduced = BigUint::from_bytes_le(bytes) % &order;
                let reduced = reduced.to_bytes_be();

                let mut padded = [0u8; Self::SIZE];
                padded[Self::SIZE - reduced.len()..].copy_from_slice(&reduced);

                let sk = blst::min_pk::SecretKey::from_bytes(&padded).map_err(|e| {
                    CryptoError::InvalidSecretKey(format!("after reduction: {e:?}"))
                })?;
                log::debug!("BLS secret key reduced modulo curve order");
                Ok(Self { sk })
            }
            Err(e) => Err(CryptoError::InvalidSecretKey(format!("{e:?}"))),
        }
    }

    /// Little-endian bytes, as stored in `BLsk` keys
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = self.sk.to_bytes();
        bytes.reverse();
        bytes
    }

    /// Compressed public key
    #[must_use]
    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.sk.sk_to_pk().to_bytes()
    }

    /// Sign `msg` under the proof-of-possession ciphersuite
    #[must_use]
    pub fn sign(&self, msg: &[u8]) -> [u8; SIGNATURE_SIZE] {
        self.sk.sign(msg, POP_CIPHERSUITE_ID, &[]).to_bytes()
    }
}

/// Check that `public_key` is a valid compressed G1 point
pub fn validate_public_key(public_key: &[u8]) -> Result<()> {
    blst::min_pk::PublicKey::from_bytes(public_key)
        .map(|_| ())
        .map_err(|e| CryptoError::InvalidPublicKey(format!("{e:?}")))
}

/// Verify a signature over `msg`
pub fn verify(public_key: &[u8], signature: &[u8], msg: &[u8]) -> Result<bool> {
    let pk = blst::min_pk::PublicKey::from_bytes(public_key)
        .map_err(|e| CryptoError::InvalidPublicKey(format!("{e:?}")))?;
    let sig = blst::min_pk::Signature::from_bytes(signature)
        .map_err(|e| CryptoError::InvalidSignature(format!("{e:?}")))?;
    Ok(sig.verify(true, msg, POP_CIPHERSUITE_ID, &[], &pk, true) == blst::BLST_ERROR::BLST_SUCCESS)
}
