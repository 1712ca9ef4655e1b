//! Consensus operations and the inlined form used to embed them
//!
//! Endorsements belong to the Emmy era and are only defined for tags versions
//! 0 and 1. Attestations and preattestations replace them from version 2.

use super::{OperationBody, read_tag, tagged_json, write_tag};
use crate::error::Result;
use crate::kind::OpKind;
use crate::params::Params;
use crate::primitives::{Reader, Writer};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tzforge_crypto::{BlockHash, BlockPayloadHash, Signature};

/// A signed single-content operation embedded in another one
///
/// Encoded as branch, tag, body and signature with no length prefix; the
/// embedding operation supplies the `u32` envelope, and the signature takes
/// whatever the envelope leaves after the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inlined<T> {
    pub branch: BlockHash,
    pub operations: T,
    pub signature: Signature,
}

impl<T: OperationBody> Inlined<T> {
    #[must_use]
    pub fn new(branch: BlockHash, operations: T, signature: Signature) -> Self {
        Self {
            branch,
            operations,
            signature,
        }
    }

    pub(crate) fn encode(&self, w: &mut Writer, params: &Params) -> Result<()> {
        w.write_bytes(self.branch.as_bytes());
        write_tag(w, T::KIND, params)?;
        self.operations.encode_body(w, params)?;
        w.write_bytes(self.signature.as_bytes());
        Ok(())
    }

    pub(crate) fn encode_prefixed(&self, w: &mut Writer, field: &'static str, params: &Params) -> Result<()> {
        w.write_sub(field, |w| self.encode(w, params))
    }

    /// Decode from a reader bounded to exactly this inlined operation
    pub(crate) fn decode(r: &mut Reader<'_>, params: &Params) -> Result<Self> {
        let branch = BlockHash::new(r.read_array("branch")?);
        read_tag(r, T::KIND, params)?;
        let operations = T::decode_body(r, params)?;
        let signature = r.read_signature(r.remaining_len(), "signature")?;
        Ok(Self {
            branch,
            operations,
            signature,
        })
    }

    pub(crate) fn decode_prefixed(r: &mut Reader<'_>, field: &'static str, params: &Params) -> Result<Self> {
        let mut sub = r.read_sub(field)?;
        Self::decode(&mut sub, params)
    }
}

impl<T: OperationBody + Serialize> Serialize for Inlined<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let operations = tagged_json(&self.operations).map_err(serde::ser::Error::custom)?;
        let mut s = serializer.serialize_struct("Inlined", 3)?;
        s.serialize_field("branch", &self.branch)?;
        s.serialize_field("operations", &operations)?;
        s.serialize_field("signature", &self.signature)?;
        s.end()
    }
}

/// Emmy endorsement of the block at `level`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Endorsement {
    pub level: i32,
}

impl Endorsement {
    #[must_use]
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl OperationBody for Endorsement {
    const KIND: OpKind = OpKind::Endorsement;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        w.write_i32(self.level);
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            level: r.read_i32("level")?,
        })
    }
}

/// Signed endorsement wrapped together with the endorser's first slot
///
/// The wrapper carries the signature, so an operation holding this variant
/// is never signed again and its outer signature is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndorsementWithSlot {
    pub endorsement: Inlined<Endorsement>,
    pub slot: u16,
}

impl EndorsementWithSlot {
    #[must_use]
    pub fn new(endorsement: Inlined<Endorsement>, slot: u16) -> Self {
        Self { endorsement, slot }
    }
}

impl OperationBody for EndorsementWithSlot {
    const KIND: OpKind = OpKind::EndorsementWithSlot;

    fn encode_body(&self, w: &mut Writer, params: &Params) -> Result<()> {
        self.endorsement.encode_prefixed(w, "endorsement", params)?;
        w.write_u16(self.slot);
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, params: &Params) -> Result<Self> {
        Ok(Self {
            endorsement: Inlined::decode_prefixed(r, "endorsement", params)?,
            slot: r.read_u16("slot")?,
        })
    }
}

macro_rules! tenderbake_vote {
    ($(#[$meta:meta])* $name:ident, $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
        pub struct $name {
            pub slot: u16,
            pub level: i32,
            pub round: i32,
            pub block_payload_hash: BlockPayloadHash,
        }

        impl $name {
            #[must_use]
            pub fn new(slot: u16, level: i32, round: i32, block_payload_hash: BlockPayloadHash) -> Self {
                Self {
                    slot,
                    level,
                    round,
                    block_payload_hash,
                }
            }
        }

        impl OperationBody for $name {
            const KIND: OpKind = OpKind::$kind;

            fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
                w.write_u16(self.slot);
                w.write_i32(self.level);
                w.write_i32(self.round);
                w.write_bytes(self.block_payload_hash.as_bytes());
                Ok(())
            }

            fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
                Ok(Self {
                    slot: r.read_u16("slot")?,
                    level: r.read_i32("level")?,
                    round: r.read_i32("round")?,
                    block_payload_hash: BlockPayloadHash::new(r.read_array("block_payload_hash")?),
                })
            }
        }
    };
}

tenderbake_vote!(
    /// Tenderbake vote for a block proposal at (level, round)
    Attestation,
    Attestation
);

tenderbake_vote!(
    /// Tenderbake pre-vote for a block proposal at (level, round)
    Preattestation,
    Preattestation
);
