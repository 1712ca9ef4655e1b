//! Public keys, signatures and private keys
//!
//! Ed25519 and BLS12-381 can sign and verify. Secp256k1 and P256 keys and
//! signatures are carried as opaque bytes so that they round trip through
//! operations, but cannot be used for cryptography here.

use crate::address::{KeyKind, PublicKeyHash, serde_as_string};
use crate::base58check;
use crate::bls;
use crate::error::{CryptoError, Result};
use ed25519_dalek::Signer as _;
use ed25519_dalek::Verifier as _;
use std::fmt;
use std::str::FromStr;

const GENERIC_SIGNATURE_PREFIX: &[u8] = &[4, 130, 43];
const ED25519_SEED_PREFIX: &[u8] = &[13, 15, 58, 7];
const ED25519_SECRET_KEY_PREFIX: &[u8] = &[43, 246, 78, 7];
const BLS_SECRET_KEY_PREFIX: &[u8] = &[3, 150, 192, 40];

/// Public key of any supported curve
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    kind: KeyKind,
    bytes: Vec<u8>,
}

impl PublicKey {
    /// Create from raw key bytes (without tag)
    pub fn new(kind: KeyKind, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != kind.public_key_size() {
            return Err(CryptoError::InvalidLength {
                what: "public key",
                expected: kind.public_key_size(),
                actual: bytes.len(),
            });
        }
        Ok(Self {
            kind,
            bytes: bytes.to_vec(),
        })
    }

    /// Curve of this key
    #[must_use]
    pub const fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Raw key bytes (without tag)
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Tagged binary form
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.bytes.len());
        out.push(self.kind.tag());
        out.extend_from_slice(&self.bytes);
        out
    }

    /// Public key hash of this key
    #[must_use]
    pub fn hash(&self) -> PublicKeyHash {
        PublicKeyHash::hash_public_key(self.kind, &self.bytes)
    }

    /// Encode to base58check (`edpk`, `sppk`, `p2pk`, `BLpk`)
    #[must_use]
    pub fn to_b58check(&self) -> String {
        base58check::encode(self.kind.public_key_prefix(), &self.bytes)
    }

    /// Decode from base58check
    pub fn from_b58check(s: &str) -> Result<Self> {
        let payload = base58check::decode_unchecked_prefix(s)?;
        for kind in KeyKind::ALL {
            let prefix = kind.public_key_prefix();
            if payload.len() == prefix.len() + kind.public_key_size()
                && payload.starts_with(prefix)
            {
                return Self::new(kind, &payload[prefix.len()..]);
            }
        }
        Err(CryptoError::Base58(format!("not a public key: {s}")))
    }

    /// Verify `signature` over `msg`
    pub fn verify(&self, msg: &[u8], signature: &Signature) -> Result<bool> {
        if let Some(kind) = signature.kind()
            && kind != self.kind
        {
            return Ok(false);
        }
        match self.kind {
            KeyKind::Ed25519 => {
                let key: [u8; 32] = self.bytes.as_slice().try_into().map_err(|_| {
                    CryptoError::InvalidPublicKey("ed25519 key must be 32 bytes".to_string())
                })?;
                let key = ed25519_dalek::VerifyingKey::from_bytes(&key)
                    .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
                let sig = ed25519_dalek::Signature::from_slice(signature.as_bytes())
                    .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
                Ok(key.verify(msg, &sig).is_ok())
            }
            KeyKind::Bls12_381 => bls::verify(&self.bytes, signature.as_bytes(), msg),
            KeyKind::Secp256k1 => Err(CryptoError::UnsupportedKey("secp256k1")),
            KeyKind::P256 => Err(CryptoError::UnsupportedKey("p256")),
        }
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_b58check())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_b58check())
    }
}

impl FromStr for PublicKey {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_b58check(s)
    }
}

/// A signature as carried in operations
///
/// The wire form has no curve tag. `kind` is known when the signature was
/// produced locally or parsed from a typed text form; signatures decoded from
/// bytes are generic (64 bytes) or BLS (96 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    kind: Option<KeyKind>,
    bytes: Vec<u8>,
}

impl Signature {
    /// Size of Ed25519, Secp256k1 and P256 signatures
    pub const GENERIC_SIZE: usize = 64;
    /// Size of BLS12-381 signatures
    pub const BLS_SIZE: usize = bls::SIGNATURE_SIZE;

    /// Create from raw bytes of a known curve
    pub fn new(kind: KeyKind, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != kind.signature_size() {
            return Err(CryptoError::InvalidLength {
                what: "signature",
                expected: kind.signature_size(),
                actual: bytes.len(),
            });
        }
        Ok(Self {
            kind: Some(kind),
            bytes: bytes.to_vec(),
        })
    }

    /// Create from untagged wire bytes (64 bytes generic, 96 bytes BLS)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes.len() {
            Self::GENERIC_SIZE => Ok(Self {
                kind: None,
                bytes: bytes.to_vec(),
            }),
            Self::BLS_SIZE => Self::new(KeyKind::Bls12_381, bytes),
            actual => Err(CryptoError::InvalidLength {
                what: "signature",
                expected: Self::GENERIC_SIZE,
                actual,
            }),
        }
    }

    /// Curve, when known
    #[must_use]
    pub const fn kind(&self) -> Option<KeyKind> {
        self.kind
    }

    /// Raw signature bytes as sent on the wire
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encode to base58check using the curve-specific prefix, or `sig` when
    /// the curve is unknown
    #[must_use]
    pub fn to_b58check(&self) -> String {
        let prefix = self
            .kind
            .map_or(GENERIC_SIGNATURE_PREFIX, KeyKind::signature_prefix);
        base58check::encode(prefix, &self.bytes)
    }

    /// Decode from base58check (`edsig`, `spsig1`, `p2sig`, `BLsig`, `sig`)
    pub fn from_b58check(s: &str) -> Result<Self> {
        let payload = base58check::decode_unchecked_prefix(s)?;
        for kind in KeyKind::ALL {
            let prefix = kind.signature_prefix();
            if payload.len() == prefix.len() + kind.signature_size()
                && payload.starts_with(prefix)
            {
                return Self::new(kind, &payload[prefix.len()..]);
            }
        }
        if payload.len() == GENERIC_SIGNATURE_PREFIX.len() + Self::GENERIC_SIZE
            && payload.starts_with(GENERIC_SIGNATURE_PREFIX)
        {
            return Self::from_bytes(&payload[GENERIC_SIGNATURE_PREFIX.len()..]);
        }
        Err(CryptoError::Base58(format!("not a signature: {s}")))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_b58check())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_b58check())
    }
}

impl FromStr for Signature {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_b58check(s)
    }
}

serde_as_string!(PublicKey);
serde_as_string!(Signature);

/// A private key able to sign locally
#[derive(Clone)]
pub enum PrivateKey {
    /// Ed25519 signing key
    Ed25519(ed25519_dalek::SigningKey),
    /// BLS12-381 secret key
    Bls12_381(bls::SecretKey),
}

impl PrivateKey {
    /// Generate a key of the given curve from a seed, or from OS randomness
    pub fn generate(kind: KeyKind, seed: Option<&[u8; 32]>) -> Result<Self> {
        let seed = if let Some(s) = seed {
            *s
        } else {
            let mut seed = [0u8; 32];
            getrandom::fill(&mut seed)
                .map_err(|e| CryptoError::KeyGeneration(format!("Random generation failed: {e}")))?;
            seed
        };

        match kind {
            KeyKind::Ed25519 => Ok(Self::Ed25519(ed25519_dalek::SigningKey::from_bytes(&seed))),
            KeyKind::Bls12_381 => Ok(Self::Bls12_381(bls::SecretKey::from_bytes(&seed)?)),
            KeyKind::Secp256k1 => Err(CryptoError::UnsupportedKey("secp256k1")),
            KeyKind::P256 => Err(CryptoError::UnsupportedKey("p256")),
        }
    }

    /// Curve of this key
    #[must_use]
    pub const fn kind(&self) -> KeyKind {
        match self {
            Self::Ed25519(_) => KeyKind::Ed25519,
            Self::Bls12_381(_) => KeyKind::Bls12_381,
        }
    }

    /// Matching public key
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        let bytes = match self {
            Self::Ed25519(sk) => sk.verifying_key().to_bytes().to_vec(),
            Self::Bls12_381(sk) => sk.public_key_bytes().to_vec(),
        };
        PublicKey {
            kind: self.kind(),
            bytes,
        }
    }

    /// Sign raw bytes
    #[must_use]
    pub fn sign_bytes(&self, msg: &[u8]) -> Signature {
        let bytes = match self {
            Self::Ed25519(sk) => sk.sign(msg).to_bytes().to_vec(),
            Self::Bls12_381(sk) => sk.sign(msg).to_vec(),
        };
        Signature {
            kind: Some(self.kind()),
            bytes,
        }
    }

    /// Encode to base58check (`edsk` seed form or `BLsk`)
    #[must_use]
    pub fn to_b58check(&self) -> String {
        match self {
            Self::Ed25519(sk) => base58check::encode(ED25519_SEED_PREFIX, &sk.to_bytes()),
            Self::Bls12_381(sk) => base58check::encode(BLS_SECRET_KEY_PREFIX, &sk.to_bytes()),
        }
    }

    /// Decode from base58check. Both the 32-byte seed and the 64-byte
    /// expanded `edsk` forms are accepted.
    pub fn from_b58check(s: &str) -> Result<Self> {
        let payload = base58check::decode_unchecked_prefix(s)?;
        if let Some(seed) = payload.strip_prefix(ED25519_SEED_PREFIX)
            && seed.len() == 32
        {
            let seed: [u8; 32] = seed
                .try_into()
                .map_err(|_| CryptoError::InvalidSecretKey("bad ed25519 seed".to_string()))?;
            return Ok(Self::Ed25519(ed25519_dalek::SigningKey::from_bytes(&seed)));
        }
        if let Some(expanded) = payload.strip_prefix(ED25519_SECRET_KEY_PREFIX)
            && expanded.len() == 64
        {
            let seed: [u8; 32] = expanded[..32]
                .try_into()
                .map_err(|_| CryptoError::InvalidSecretKey("bad ed25519 key".to_string()))?;
            let key = ed25519_dalek::SigningKey::from_bytes(&seed);
            if key.verifying_key().as_bytes() != &expanded[32..] {
                return Err(CryptoError::InvalidSecretKey(
                    "ed25519 public half does not match seed".to_string(),
                ));
            }
            return Ok(Self::Ed25519(key));
        }
        if let Some(secret) = payload.strip_prefix(BLS_SECRET_KEY_PREFIX) {
            return Ok(Self::Bls12_381(bls::SecretKey::from_bytes(secret)?));
        }
        Err(CryptoError::Base58(
            "not an edsk or BLsk secret key".to_string(),
        ))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey({})", self.public_key().hash())
    }
}
