//! Error types for operation encoding, decoding and building

use crate::kind::OpKind;
use thiserror::Error;
use tzforge_crypto::CryptoError;

/// Errors raised by the codec and the operation container
#[derive(Error, Debug)]
pub enum CodecError {
    // === structural ===
    /// Input is shorter than the smallest possible operation
    #[error("buffer too short: need at least {min} bytes, got {len}")]
    ShortBuffer {
        /// Minimum accepted length
        min: usize,
        /// Actual length
        len: usize,
    },

    /// Input ended in the middle of a field
    #[error("unexpected end of input while reading {field}")]
    UnexpectedEof {
        /// Field being read
        field: &'static str,
    },

    /// Tag byte does not map to any operation kind in this tags version
    #[error("unknown operation tag {tag} for tags version {version}")]
    UnknownTag {
        /// The tag byte
        tag: u8,
        /// Tags version in effect
        version: u8,
    },

    /// Tag byte does not match the variant being decoded
    #[error("invalid tag for {kind}: expected {expected}, got {actual}")]
    InvalidTag {
        /// Variant being decoded
        kind: OpKind,
        /// Tag expected for this variant
        expected: u8,
        /// Tag found in the input
        actual: u8,
    },

    /// Enumerant or flag byte outside its allowed range
    #[error("invalid {field} value {value}")]
    InvalidValue {
        /// Field being read
        field: &'static str,
        /// Offending value
        value: u64,
    },

    /// Field bytes were present but could not be interpreted
    #[error("malformed {field}: {reason}")]
    Malformed {
        /// Field being read
        field: &'static str,
        /// Human readable reason
        reason: String,
    },

    /// A fixed-width primitive failed to parse
    #[error("invalid {field}: {source}")]
    Primitive {
        /// Field being read
        field: &'static str,
        /// Underlying primitive error
        #[source]
        source: CryptoError,
    },

    /// Declared length is larger than what the input or protocol allows
    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        /// Field being read
        field: &'static str,
        /// Declared length
        len: usize,
        /// Allowed maximum
        max: usize,
    },

    /// Failure inside a specific operation
    #[error("{kind}: {source}")]
    Operation {
        /// Variant that failed
        kind: OpKind,
        /// Underlying error
        #[source]
        source: Box<CodecError>,
    },

    // === precondition ===
    /// Branch is required to serialize or sign
    #[error("operation has no branch")]
    MissingBranch,

    /// At least one content operation is required to serialize or sign
    #[error("operation contents are empty")]
    EmptyContents,

    /// A builder needed a default source before `with_source` was called
    #[error("no source set: call with_source before adding source-dependent operations")]
    MissingSource,

    // === convergence ===
    /// Fee fixed-point iteration did not settle
    #[error("fee for operation {index} did not converge after {iterations} iterations (last fee {fee})")]
    FeeNotConverged {
        /// Position of the operation in the batch
        index: usize,
        /// Iterations performed
        iterations: usize,
        /// Last computed fee
        fee: u64,
    },

    // === encoding ===
    /// Operation kind has no tag in the selected tags version
    #[error("{kind} cannot be encoded with tags version {version}")]
    UnsupportedKind {
        /// Variant being encoded
        kind: OpKind,
        /// Tags version in effect
        version: u8,
    },

    /// Error from the primitives crate outside of decoding
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// JSON (de)serialization failure
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    /// Wrap this error with the operation kind it occurred in
    #[must_use]
    pub fn in_operation(self, kind: OpKind) -> Self {
        Self::Operation {
            kind,
            source: Box::new(self),
        }
    }

    /// Innermost error, skipping `Operation` wrappers
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Operation { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;
