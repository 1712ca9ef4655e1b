//! Public key hashes and account addresses
//!
//! Two binary forms exist on the wire:
//! - the 21-byte implicit form `[curve tag][20-byte hash]` used wherever only
//!   an implicit account is allowed (sources, delegates, bakers)
//! - the 22-byte padded form used wherever any contract may appear
//!   (transaction destinations, ticketers):
//!   `0x00 [curve tag] [hash]`, `0x01 [hash] 0x00` for originated contracts,
//!   `0x03 [hash] 0x00` for smart rollups

use crate::base58check;
use crate::error::{CryptoError, Result};
use crate::hash::{ContractHash, SmartRollupAddress, blake2b_160};
use std::fmt;
use std::str::FromStr;

/// Signature curve of an implicit account, public key or signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyKind {
    /// `tz1` / `edpk` / `edsig`
    Ed25519,
    /// `tz2` / `sppk` / `spsig1`
    Secp256k1,
    /// `tz3` / `p2pk` / `p2sig`
    P256,
    /// `tz4` / `BLpk` / `BLsig`
    Bls12_381,
}

impl KeyKind {
    /// All curves, in tag order
    pub const ALL: [Self; 4] = [Self::Ed25519, Self::Secp256k1, Self::P256, Self::Bls12_381];

    /// Binary tag used in public key hashes and public keys
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Ed25519 => 0,
            Self::Secp256k1 => 1,
            Self::P256 => 2,
            Self::Bls12_381 => 3,
        }
    }

    /// Inverse of [`KeyKind::tag`]
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Self::Ed25519),
            1 => Ok(Self::Secp256k1),
            2 => Ok(Self::P256),
            3 => Ok(Self::Bls12_381),
            _ => Err(CryptoError::InvalidTag {
                what: "key kind",
                tag,
            }),
        }
    }

    /// Size of a public key of this curve, without the tag byte
    #[must_use]
    pub const fn public_key_size(self) -> usize {
        match self {
            Self::Ed25519 => 32,
            Self::Secp256k1 | Self::P256 => 33,
            Self::Bls12_381 => 48,
        }
    }

    /// Size of a signature produced by this curve
    #[must_use]
    pub const fn signature_size(self) -> usize {
        match self {
            Self::Bls12_381 => 96,
            _ => 64,
        }
    }

    pub(crate) const fn pkh_prefix(self) -> &'static [u8] {
        match self {
            Self::Ed25519 => &[6, 161, 159],
            Self::Secp256k1 => &[6, 161, 161],
            Self::P256 => &[6, 161, 164],
            Self::Bls12_381 => &[6, 161, 166],
        }
    }

    pub(crate) const fn public_key_prefix(self) -> &'static [u8] {
        match self {
            Self::Ed25519 => &[13, 15, 37, 217],
            Self::Secp256k1 => &[3, 254, 226, 86],
            Self::P256 => &[3, 178, 139, 127],
            Self::Bls12_381 => &[6, 149, 135, 204],
        }
    }

    pub(crate) const fn signature_prefix(self) -> &'static [u8] {
        match self {
            Self::Ed25519 => &[9, 245, 205, 134, 18],
            Self::Secp256k1 => &[13, 115, 101, 19, 63],
            Self::P256 => &[54, 240, 44, 52],
            Self::Bls12_381 => &[40, 171, 64, 207],
        }
    }
}

/// Hash of a public key (an implicit account, `tz1`..`tz4`)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKeyHash {
    kind: KeyKind,
    hash: [u8; 20],
}

impl PublicKeyHash {
    /// Size of the hash without curve tag
    pub const HASH_SIZE: usize = 20;
    /// Size of the tagged binary form
    pub const SIZE: usize = 21;

    /// Wrap a raw 20-byte hash of the given curve
    #[must_use]
    pub const fn new(kind: KeyKind, hash: [u8; 20]) -> Self {
        Self { kind, hash }
    }

    /// Hash raw public key bytes (without tag) into a public key hash
    #[must_use]
    pub fn hash_public_key(kind: KeyKind, key: &[u8]) -> Self {
        Self::new(kind, blake2b_160(key))
    }

    /// Curve of the underlying key
    #[must_use]
    pub const fn kind(&self) -> KeyKind {
        self.kind
    }

    /// The 20 hash bytes
    #[must_use]
    pub const fn hash(&self) -> &[u8; 20] {
        &self.hash
    }

    /// Tagged 21-byte binary form
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0] = self.kind.tag();
        out[1..].copy_from_slice(&self.hash);
        out
    }

    /// Parse the tagged 21-byte binary form
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::SIZE {
            return Err(CryptoError::InvalidLength {
                what: "public key hash",
                expected: Self::SIZE,
                actual: bytes.len(),
            });
        }
        let kind = KeyKind::from_tag(bytes[0])?;
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&bytes[1..]);
        Ok(Self { kind, hash })
    }

    /// Encode to base58check (`tz1`..`tz4`)
    #[must_use]
    pub fn to_b58check(&self) -> String {
        base58check::encode(self.kind.pkh_prefix(), &self.hash)
    }

    /// Decode from base58check, detecting the curve from the prefix
    pub fn from_b58check(s: &str) -> Result<Self> {
        let payload = base58check::decode_unchecked_prefix(s)?;
        for kind in KeyKind::ALL {
            let prefix = kind.pkh_prefix();
            if payload.len() == prefix.len() + Self::HASH_SIZE && payload.starts_with(prefix) {
                let mut hash = [0u8; 20];
                hash.copy_from_slice(&payload[prefix.len()..]);
                return Ok(Self { kind, hash });
            }
        }
        Err(CryptoError::Base58(format!("not a public key hash: {s}")))
    }
}

impl fmt::Display for PublicKeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_b58check())
    }
}

impl fmt::Debug for PublicKeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKeyHash({})", self.to_b58check())
    }
}

impl FromStr for PublicKeyHash {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_b58check(s)
    }
}

/// Any account that can appear as a destination
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Address {
    /// Implicit account controlled by a key
    Implicit(PublicKeyHash),
    /// Originated smart contract
    Contract(ContractHash),
    /// Smart rollup
    SmartRollup(SmartRollupAddress),
}

impl Address {
    /// Size of the padded binary form
    pub const SIZE: usize = 22;

    /// Padded 22-byte binary form
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        match self {
            Self::Implicit(pkh) => {
                out[1..].copy_from_slice(&pkh.to_bytes());
            }
            Self::Contract(hash) => {
                out[0] = 0x01;
                out[1..21].copy_from_slice(hash.as_bytes());
            }
            Self::SmartRollup(hash) => {
                out[0] = 0x03;
                out[1..21].copy_from_slice(hash.as_bytes());
            }
        }
        out
    }

    /// Parse the padded 22-byte binary form
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::SIZE {
            return Err(CryptoError::InvalidLength {
                what: "address",
                expected: Self::SIZE,
                actual: bytes.len(),
            });
        }
        match bytes[0] {
            0x00 => Ok(Self::Implicit(PublicKeyHash::from_bytes(&bytes[1..])?)),
            0x01 | 0x03 if bytes[21] != 0x00 => Err(CryptoError::InvalidTag {
                what: "address padding",
                tag: bytes[21],
            }),
            0x01 => Ok(Self::Contract(ContractHash::from_slice(&bytes[1..21])?)),
            0x03 => Ok(Self::SmartRollup(SmartRollupAddress::from_slice(
                &bytes[1..21],
            )?)),
            tag => Err(CryptoError::InvalidTag {
                what: "address",
                tag,
            }),
        }
    }

    /// Implicit account behind this address, if any
    #[must_use]
    pub const fn as_implicit(&self) -> Option<&PublicKeyHash> {
        match self {
            Self::Implicit(pkh) => Some(pkh),
            _ => None,
        }
    }

    /// Encode to base58check
    #[must_use]
    pub fn to_b58check(&self) -> String {
        match self {
            Self::Implicit(pkh) => pkh.to_b58check(),
            Self::Contract(hash) => hash.to_b58check(),
            Self::SmartRollup(hash) => hash.to_b58check(),
        }
    }

    /// Decode from base58check, dispatching on the textual prefix
    pub fn from_b58check(s: &str) -> Result<Self> {
        match s.get(..3) {
            Some("KT1") => Ok(Self::Contract(ContractHash::from_b58check(s)?)),
            Some("sr1") => Ok(Self::SmartRollup(SmartRollupAddress::from_b58check(s)?)),
            _ => Ok(Self::Implicit(PublicKeyHash::from_b58check(s)?)),
        }
    }
}

impl From<PublicKeyHash> for Address {
    fn from(pkh: PublicKeyHash) -> Self {
        Self::Implicit(pkh)
    }
}

impl From<ContractHash> for Address {
    fn from(hash: ContractHash) -> Self {
        Self::Contract(hash)
    }
}

impl From<SmartRollupAddress> for Address {
    fn from(hash: SmartRollupAddress) -> Self {
        Self::SmartRollup(hash)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_b58check())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_b58check())
    }
}

impl FromStr for Address {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_b58check(s)
    }
}

macro_rules! serde_as_string {
    ($name:ty) => {
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use serde_as_string;

serde_as_string!(PublicKeyHash);
serde_as_string!(Address);
