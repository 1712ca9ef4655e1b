//! Fixed-width Tezos wire primitives
//!
//! Everything in this crate has a fixed binary size (or a size implied by a
//! leading tag) and a base58check text form:
//!
//! - `hash` ← block, operation, protocol, context and rollup hashes, chain id
//! - `address` ← implicit account hashes (`tz1`..`tz4`) and padded addresses
//! - `key` ← public keys, signatures and local private keys
//! - `signer` ← the [`Signer`] capability used to sign operations
//!
//! # Example Usage
//!
//! ```rust
//! use tzforge_crypto::{KeyKind, PrivateKey, Signer};
//!
//! let key = PrivateKey::generate(KeyKind::Ed25519, Some(&[42u8; 32])).unwrap();
//! let signature = key.sign(&[0u8; 32]).unwrap();
//! assert_eq!(signature.as_bytes().len(), 64);
//! println!("Signer address: {}", key.address());
//! ```

#![warn(missing_docs)]

pub mod address;
pub mod base58check;
pub mod bls;
pub mod error;
pub mod hash;
pub mod key;
pub mod signer;

pub use address::{Address, KeyKind, PublicKeyHash};
pub use error::{CryptoError, Result};
pub use hash::{
    BlockHash, BlockPayloadHash, ChainId, ContextHash, ContractHash, DalCommitment, NonceHash,
    OperationHash, OperationListListHash, ProtocolHash, SmartRollupAddress,
    SmartRollupCommitmentHash, SmartRollupStateHash, blake2b_160, blake2b_256,
};
pub use key::{PrivateKey, PublicKey, Signature};
pub use signer::Signer;
