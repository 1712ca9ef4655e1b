//! Fixed-width hashes and identifiers
//!
//! Every type here is a plain byte array on the wire and a base58check
//! string (with a type-specific prefix) in JSON and text form.
//!
//! Prefixes follow `src/lib_crypto/base58.ml` in Octez.

use crate::base58check;
use crate::error::{CryptoError, Result};
use blake2::digest::consts::{U20, U32};
use blake2::{Blake2b, Digest};
use std::fmt;
use std::str::FromStr;

type Blake2b20 = Blake2b<U20>;
type Blake2b32 = Blake2b<U32>;

/// 32-byte `Blake2B` digest, the hash used for operation digests and hashes
#[must_use]
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Blake2b32::digest(data));
    out
}

/// 20-byte `Blake2B` digest, the hash used for public key hashes
#[must_use]
pub fn blake2b_160(data: &[u8]) -> [u8; 20] {
    let mut out = [0u8; 20];
    out.copy_from_slice(&Blake2b20::digest(data));
    out
}

macro_rules! define_hash {
    ($(#[$meta:meta])* $name:ident, $size:expr, $prefix:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; $size]);

        impl $name {
            /// Size in bytes on the wire
            pub const SIZE: usize = $size;

            const PREFIX: &'static [u8] = $prefix;

            /// Wrap raw bytes
            #[must_use]
            pub const fn new(bytes: [u8; $size]) -> Self {
                Self(bytes)
            }

            /// Create from a slice of exactly `SIZE` bytes
            pub fn from_slice(bytes: &[u8]) -> Result<Self> {
                let array: [u8; $size] =
                    bytes.try_into().map_err(|_| CryptoError::InvalidLength {
                        what: stringify!($name),
                        expected: $size,
                        actual: bytes.len(),
                    })?;
                Ok(Self(array))
            }

            /// Borrow the raw bytes
            #[must_use]
            pub const fn as_bytes(&self) -> &[u8; $size] {
                &self.0
            }

            /// Encode to base58check
            #[must_use]
            pub fn to_b58check(&self) -> String {
                base58check::encode(Self::PREFIX, &self.0)
            }

            /// Decode from base58check
            pub fn from_b58check(s: &str) -> Result<Self> {
                let decoded = base58check::decode(s, Self::PREFIX)?;
                Self::from_slice(&decoded)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_b58check())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_b58check())
            }
        }

        impl FromStr for $name {
            type Err = CryptoError;

            fn from_str(s: &str) -> Result<Self> {
                Self::from_b58check(s)
            }
        }

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

define_hash!(
    /// Block hash (`B...`), used as an operation branch
    BlockHash, 32, &[1, 52]
);
define_hash!(
    /// Protocol hash (`P...`)
    ProtocolHash, 32, &[2, 170]
);
define_hash!(
    /// Operation hash (`o...`)
    OperationHash, 32, &[5, 116]
);
define_hash!(
    /// Operation list list hash (`LLo...`) found in block headers
    OperationListListHash, 32, &[29, 159, 109]
);
define_hash!(
    /// Context hash (`Co...`)
    ContextHash, 32, &[79, 199]
);
define_hash!(
    /// Block payload hash (`vh...`)
    BlockPayloadHash, 32, &[1, 106, 242]
);
define_hash!(
    /// Seed nonce hash (`nce...`)
    NonceHash, 32, &[69, 220, 169]
);
define_hash!(
    /// Chain identifier (`Net...`), 4 bytes on the wire
    ChainId, 4, &[87, 82, 0]
);
define_hash!(
    /// Originated contract hash (`KT1...`)
    ContractHash, 20, &[2, 90, 121]
);
define_hash!(
    /// Smart rollup address (`sr1...`)
    SmartRollupAddress, 20, &[6, 124, 117]
);
define_hash!(
    /// Smart rollup commitment hash (`src1...`)
    SmartRollupCommitmentHash, 32, &[17, 165, 134, 138]
);
define_hash!(
    /// Smart rollup state hash (`srs1...`)
    SmartRollupStateHash, 32, &[17, 165, 235, 240]
);
define_hash!(
    /// DAL slot commitment (`sh...`), 48 bytes
    DalCommitment, 48, &[2, 116, 180]
);

impl BlockHash {
    /// Hash arbitrary bytes into a block hash (test and tooling helper)
    #[must_use]
    pub fn digest(data: &[u8]) -> Self {
        Self(blake2b_256(data))
    }
}

impl OperationHash {
    /// Hash the broadcastable bytes of an operation
    #[must_use]
    pub fn digest(data: &[u8]) -> Self {
        Self(blake2b_256(data))
    }
}
