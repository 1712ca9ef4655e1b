//! Tezos operation forging
//!
//! Builds, encodes, decodes, fee-settles and signs operation groups:
//!
//! - `operations` ← every operation kind with its binary and JSON form
//! - `kind` ← the version-aware tag table
//! - `op` ← the [`Op`] group container and its builder
//! - `fee` ← minimum fee and the fee/size fixed point
//! - `watermark` ← signing watermarks
//! - `decode` ← bytes back to an [`Op`]
//!
//! # Example Usage
//!
//! ```rust
//! use tzforge_codec::{Op, SignatureTail, Params, decode_op_with};
//! use tzforge_crypto::{BlockHash, KeyKind, PrivateKey, PublicKeyHash};
//!
//! let key = PrivateKey::generate(KeyKind::Ed25519, Some(&[1u8; 32])).unwrap();
//! let to = PublicKeyHash::new(KeyKind::Ed25519, [2u8; 20]);
//! let mut op = Op::new()
//!     .with_source(key.public_key().hash())
//!     .with_delegation(to)
//!     .unwrap()
//!     .with_branch(BlockHash::new([3u8; 32]))
//!     .with_min_fee()
//!     .unwrap();
//! op.sign(&key).unwrap();
//!
//! let bytes = op.bytes().unwrap();
//! let decoded = decode_op_with(&bytes, &Params::default(), SignatureTail::Required(64)).unwrap();
//! assert_eq!(decoded.contents, op.contents);
//! ```

pub mod decode;
pub mod error;
pub mod fee;
pub(crate) mod json;
pub mod kind;
pub mod limits;
pub mod op;
pub mod operations;
pub mod params;
pub mod primitives;
pub mod value;
pub mod watermark;

pub use decode::{SignatureTail, decode_op, decode_op_with};
pub use error::{CodecError, Result};
pub use kind::OpKind;
pub use limits::{Costs, Limits};
pub use op::Op;
pub use operations::{ManagerFields, Operation, OperationBody};
pub use params::Params;
pub use value::{Entrypoint, MichelineEncode, Parameters, Script, Value};
pub use watermark::Watermark;
