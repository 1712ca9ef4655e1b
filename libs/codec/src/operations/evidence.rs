//! Denunciations of double signing
//!
//! Each evidence carries the two conflicting signed objects. Only the
//! Tenderbake block header layout is supported for double-baking evidence.

use super::{Attestation, Endorsement, Inlined, OperationBody, Preattestation};
use crate::error::{CodecError, Result};
use crate::kind::OpKind;
use crate::params::Params;
use crate::primitives::{Reader, Writer};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tzforge_crypto::{
    BlockHash, BlockPayloadHash, ContextHash, NonceHash, OperationListListHash, Signature,
};

/// A signed Tenderbake block header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockHeader {
    pub level: i32,
    pub proto: u8,
    pub predecessor: BlockHash,
    pub timestamp: DateTime<Utc>,
    pub validation_pass: u8,
    pub operations_hash: OperationListListHash,
    #[serde(serialize_with = "crate::json::hex_list::serialize")]
    pub fitness: Vec<Vec<u8>>,
    pub context: ContextHash,
    pub payload_hash: BlockPayloadHash,
    pub payload_round: i32,
    #[serde(with = "crate::json::hex_bytes")]
    pub proof_of_work_nonce: [u8; 8],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_nonce_hash: Option<NonceHash>,
    pub per_block_votes: u8,
    pub signature: Signature,
}

impl BlockHeader {
    pub(crate) fn encode(&self, w: &mut Writer) -> Result<()> {
        w.write_i32(self.level);
        w.write_byte(self.proto);
        w.write_bytes(self.predecessor.as_bytes());
        w.write_i64(self.timestamp.timestamp());
        w.write_byte(self.validation_pass);
        w.write_bytes(self.operations_hash.as_bytes());
        w.write_sub("fitness", |w| {
            self.fitness
                .iter()
                .try_for_each(|element| w.write_bytes_prefixed(element, "fitness"))
        })?;
        w.write_bytes(self.context.as_bytes());
        w.write_bytes(self.payload_hash.as_bytes());
        w.write_i32(self.payload_round);
        w.write_bytes(&self.proof_of_work_nonce);
        w.write_option(self.seed_nonce_hash.as_ref(), |w, hash| {
            w.write_bytes(hash.as_bytes());
        });
        w.write_byte(self.per_block_votes);
        w.write_bytes(self.signature.as_bytes());
        Ok(())
    }

    /// Decode from a reader bounded to exactly this header
    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let level = r.read_i32("level")?;
        let proto = r.read_byte("proto")?;
        let predecessor = BlockHash::new(r.read_array("predecessor")?);
        let seconds = r.read_i64("timestamp")?;
        let timestamp = DateTime::from_timestamp(seconds, 0).ok_or(CodecError::Malformed {
            field: "timestamp",
            reason: format!("{seconds} is out of range"),
        })?;
        let validation_pass = r.read_byte("validation_pass")?;
        let operations_hash = OperationListListHash::new(r.read_array("operations_hash")?);
        let mut list = r.read_sub("fitness")?;
        let mut fitness = Vec::new();
        while !list.is_empty() {
            fitness.push(list.read_bytes_prefixed("fitness")?);
        }
        Ok(Self {
            level,
            proto,
            predecessor,
            timestamp,
            validation_pass,
            operations_hash,
            fitness,
            context: ContextHash::new(r.read_array("context")?),
            payload_hash: BlockPayloadHash::new(r.read_array("payload_hash")?),
            payload_round: r.read_i32("payload_round")?,
            proof_of_work_nonce: r.read_array("proof_of_work_nonce")?,
            seed_nonce_hash: r.read_option("seed_nonce_hash", |r| {
                Ok(NonceHash::new(r.read_array("seed_nonce_hash")?))
            })?,
            per_block_votes: r.read_byte("per_block_votes")?,
            signature: r.read_signature(r.remaining_len(), "signature")?,
        })
    }

    fn encode_prefixed(&self, w: &mut Writer, field: &'static str) -> Result<()> {
        w.write_sub(field, |w| self.encode(w))
    }

    fn decode_prefixed(r: &mut Reader<'_>, field: &'static str) -> Result<Self> {
        Self::decode(&mut r.read_sub(field)?)
    }
}

/// Two different blocks signed by the same baker at the same level and round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoubleBakingEvidence {
    pub bh1: BlockHeader,
    pub bh2: BlockHeader,
}

impl DoubleBakingEvidence {
    #[must_use]
    pub fn new(bh1: BlockHeader, bh2: BlockHeader) -> Self {
        Self { bh1, bh2 }
    }
}

impl OperationBody for DoubleBakingEvidence {
    const KIND: OpKind = OpKind::DoubleBakingEvidence;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        self.bh1.encode_prefixed(w, "bh1")?;
        self.bh2.encode_prefixed(w, "bh2")
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            bh1: BlockHeader::decode_prefixed(r, "bh1")?,
            bh2: BlockHeader::decode_prefixed(r, "bh2")?,
        })
    }
}

/// Two conflicting Emmy endorsements, with the offender's slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoubleEndorsementEvidence {
    pub op1: Inlined<Endorsement>,
    pub op2: Inlined<Endorsement>,
    pub slot: u16,
}

impl DoubleEndorsementEvidence {
    #[must_use]
    pub fn new(op1: Inlined<Endorsement>, op2: Inlined<Endorsement>, slot: u16) -> Self {
        Self { op1, op2, slot }
    }
}

impl OperationBody for DoubleEndorsementEvidence {
    const KIND: OpKind = OpKind::DoubleEndorsementEvidence;

    fn encode_body(&self, w: &mut Writer, params: &Params) -> Result<()> {
        self.op1.encode_prefixed(w, "op1", params)?;
        self.op2.encode_prefixed(w, "op2", params)?;
        w.write_u16(self.slot);
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, params: &Params) -> Result<Self> {
        Ok(Self {
            op1: Inlined::decode_prefixed(r, "op1", params)?,
            op2: Inlined::decode_prefixed(r, "op2", params)?,
            slot: r.read_u16("slot")?,
        })
    }
}

macro_rules! double_vote_evidence {
    ($(#[$meta:meta])* $name:ident, $vote:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
        pub struct $name {
            pub op1: Inlined<$vote>,
            pub op2: Inlined<$vote>,
        }

        impl $name {
            #[must_use]
            pub fn new(op1: Inlined<$vote>, op2: Inlined<$vote>) -> Self {
                Self { op1, op2 }
            }
        }

        impl OperationBody for $name {
            const KIND: OpKind = OpKind::$name;

            fn encode_body(&self, w: &mut Writer, params: &Params) -> Result<()> {
                self.op1.encode_prefixed(w, "op1", params)?;
                self.op2.encode_prefixed(w, "op2", params)
            }

            fn decode_body(r: &mut Reader<'_>, params: &Params) -> Result<Self> {
                Ok(Self {
                    op1: Inlined::decode_prefixed(r, "op1", params)?,
                    op2: Inlined::decode_prefixed(r, "op2", params)?,
                })
            }
        }
    };
}

double_vote_evidence!(
    /// Two conflicting attestations from the same delegate
    DoubleAttestationEvidence,
    Attestation
);

double_vote_evidence!(
    /// Two conflicting preattestations from the same delegate
    DoublePreattestationEvidence,
    Preattestation
);
