//! Batch dispatcher: raw bytes to a typed [`Op`]
//!
//! The wire form of an operation group has no end-of-contents marker, so a
//! trailing signature can only be recognized by its length. [`SignatureTail`]
//! makes that choice explicit.

use crate::error::{CodecError, Result};
use crate::kind::OpKind;
use crate::op::Op;
use crate::operations::Operation;
use crate::params::Params;
use crate::primitives::Reader;
use log::{debug, warn};
use tzforge_crypto::{BlockHash, Signature};

/// Branch plus the smallest possible content
pub const MIN_OPERATION_SIZE: usize = BlockHash::SIZE + 5;

/// How the dispatcher finds the signature at the end of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureTail {
    /// Stop at an unknown tag when exactly `len` bytes remain, and read them
    /// as the signature
    ///
    /// A signature whose first byte happens to be a known tag is decoded as
    /// an operation and fails; use [`SignatureTail::Required`] when the
    /// input is known to be signed.
    Heuristic(usize),
    /// The last `len` bytes are the signature
    Required(usize),
    /// Unsigned input; every byte after the branch is contents
    Absent,
}

impl Default for SignatureTail {
    fn default() -> Self {
        Self::Heuristic(Signature::GENERIC_SIZE)
    }
}

/// Decode with default parameters and the default signature heuristic
pub fn decode_op(data: &[u8]) -> Result<Op> {
    decode_op_with(data, &Params::default(), SignatureTail::default())
}

/// Decode an operation group under `params`
///
/// Every tag is looked up in the tags version of `params`. Unknown tags are
/// fatal unless `tail` is [`SignatureTail::Heuristic`] and the remaining
/// bytes are exactly a signature.
pub fn decode_op_with(data: &[u8], params: &Params, tail: SignatureTail) -> Result<Op> {
    if data.len() < MIN_OPERATION_SIZE {
        return Err(CodecError::ShortBuffer {
            min: MIN_OPERATION_SIZE,
            len: data.len(),
        });
    }

    let (body, signature) = match tail {
        SignatureTail::Required(len) => {
            let split = data.len().checked_sub(len).filter(|n| *n >= MIN_OPERATION_SIZE).ok_or(
                CodecError::ShortBuffer {
                    min: MIN_OPERATION_SIZE + len,
                    len: data.len(),
                },
            )?;
            let (body, signature) = data.split_at(split);
            (body, Some(signature))
        }
        SignatureTail::Heuristic(_) | SignatureTail::Absent => (data, None),
    };

    let mut r = Reader::new(body);
    let branch = BlockHash::new(r.read_array("branch")?);
    let mut contents = Vec::new();
    while !r.is_empty() {
        if let SignatureTail::Heuristic(len) = tail
            && r.remaining_len() == len
            && is_unknown_tag(&r, params)
        {
            warn!("unknown tag with {len} bytes left, reading them as the signature");
            break;
        }
        contents.push(Operation::decode(&mut r, params)?);
    }

    let signature = match signature {
        Some(bytes) => Some(Reader::new(bytes).read_signature(bytes.len(), "signature")?),
        None if r.is_empty() => None,
        None => Some(r.read_signature(r.remaining_len(), "signature")?),
    };

    if contents.is_empty() {
        return Err(CodecError::EmptyContents);
    }

    debug!(
        "decoded {} operations ({}) on {}, signed: {}",
        contents.len(),
        summary(&contents),
        branch,
        signature.is_some()
    );

    let mut op = Op::new().with_params(params.clone()).with_branch(branch);
    op.contents = contents;
    op.signature = signature;
    Ok(op)
}

fn is_unknown_tag(r: &Reader<'_>, params: &Params) -> bool {
    r.peek_byte()
        .is_some_and(|tag| OpKind::from_tag(tag, params.operation_tags_version).is_none())
}

fn summary(contents: &[Operation]) -> String {
    contents
        .iter()
        .map(|op| op.kind().name())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::fixtures::{branch, contract, manager, signature};
    use crate::operations::{FailingNoop, Transaction};

    fn transfer() -> Op {
        Op::new()
            .with_branch(branch(9))
            .with_contents(Transaction::new(manager(1), contract(2), 1_000))
    }

    #[test]
    fn test_short_buffer() {
        let err = decode_op(&[0u8; 36]).unwrap_err();
        assert!(matches!(err, CodecError::ShortBuffer { min: 37, len: 36 }));
    }

    #[test]
    fn test_unsigned_roundtrip() {
        let op = transfer();
        let bytes = op.bytes().unwrap();
        let decoded = decode_op(&bytes).unwrap();
        assert_eq!(decoded.branch, op.branch);
        assert_eq!(decoded.contents, op.contents);
        assert!(decoded.signature.is_none());
        assert_eq!(decoded.bytes().unwrap(), bytes);
    }

    #[test]
    fn test_heuristic_reads_signature_after_unknown_tag() {
        // 0xff is not a tag in any version
        let sig = Signature::from_bytes(&[0xff; 64]).unwrap();
        let op = transfer().with_signature(sig.clone());
        let decoded = decode_op(&op.bytes().unwrap()).unwrap();
        assert_eq!(decoded.contents.len(), 1);
        assert_eq!(decoded.signature, Some(sig));
    }

    #[test]
    fn test_heuristic_does_not_swallow_unknown_tags() {
        let mut bytes = transfer().bytes().unwrap();
        bytes.extend_from_slice(&[0xff; 10]);
        let err = decode_op(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::UnknownTag { tag: 0xff, .. }));
    }

    #[test]
    fn test_required_tail_handles_any_signature_bytes() {
        // 0x6c is the transaction tag, which defeats the heuristic
        let sig = signature(0x6c);
        let op = transfer().with_signature(sig.clone());
        let bytes = op.bytes().unwrap();
        assert!(decode_op(&bytes).is_err());

        let decoded = decode_op_with(&bytes, &Params::default(), SignatureTail::Required(64)).unwrap();
        assert_eq!(decoded.signature, Some(sig));
        assert_eq!(decoded.bytes().unwrap(), bytes);
    }

    #[test]
    fn test_required_bls_tail() {
        let sig = Signature::from_bytes(&[0x01; 96]).unwrap();
        let bytes = transfer().with_signature(sig.clone()).bytes().unwrap();
        let decoded = decode_op_with(&bytes, &Params::default(), SignatureTail::Required(96)).unwrap();
        assert_eq!(decoded.signature, Some(sig));
    }

    #[test]
    fn test_required_tail_too_long() {
        let bytes = transfer().bytes().unwrap();
        let err = decode_op_with(&bytes, &Params::default(), SignatureTail::Required(bytes.len())).unwrap_err();
        assert!(matches!(err, CodecError::ShortBuffer { .. }));
    }

    #[test]
    fn test_absent_rejects_trailing_signature() {
        let bytes = transfer().with_signature(signature(0xff)).bytes().unwrap();
        assert!(decode_op_with(&bytes, &Params::default(), SignatureTail::Absent).is_err());
    }

    #[test]
    fn test_truncated_operation_names_kind() {
        let bytes = transfer().bytes().unwrap();
        let err = decode_op(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Operation {
                kind: OpKind::Transaction,
                ..
            }
        ));
        assert!(matches!(err.root_cause(), CodecError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_legacy_tags_version() {
        let op = Op::new()
            .with_params(Params::legacy())
            .with_branch(branch(1))
            .with_contents(FailingNoop::new(b"hello".to_vec()));
        let bytes = op.bytes().unwrap();
        assert_eq!(bytes[32], 17);
        let decoded = decode_op_with(&bytes, &Params::legacy(), SignatureTail::Absent).unwrap();
        assert_eq!(decoded.contents, op.contents);
        assert_eq!(decoded.params.operation_tags_version, 1);
    }
}
