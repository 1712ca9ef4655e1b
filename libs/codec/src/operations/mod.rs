//! The operation variant set
//!
//! Every variant is a plain struct implementing [`OperationBody`]. The
//! [`Operation`] sum type owns the leading tag byte: it writes the
//! version-adjusted tag before the body and validates it before decoding.
//! The kind → decoder table is an exhaustive `match` over [`OpKind`].

mod anonymous;
mod consensus;
mod constant;
mod consensus_key;
mod dal;
mod delegation;
mod deposits;
mod evidence;
mod manager;
mod origination;
mod reveal;
mod rollup;
mod storage;
mod ticket;
mod transaction;
mod voting;

pub use anonymous::{ActivateAccount, DrainDelegate, FailingNoop, SeedNonceRevelation, VdfRevelation};
pub use consensus::{Attestation, Endorsement, EndorsementWithSlot, Inlined, Preattestation};
pub use consensus_key::UpdateConsensusKey;
pub use constant::RegisterGlobalConstant;
pub use dal::{DalAttestation, DalPublishCommitment};
pub use delegation::Delegation;
pub use deposits::SetDepositsLimit;
pub use evidence::{
    BlockHeader, DoubleAttestationEvidence, DoubleBakingEvidence, DoubleEndorsementEvidence,
    DoublePreattestationEvidence,
};
pub use manager::ManagerFields;
pub use origination::Origination;
pub use reveal::Reveal;
pub use rollup::{
    Dissection, DissectionChunk, InputProof, PvmKind, Refutation, RefutationMove, RevealProof,
    SmartRollupAddMessages, SmartRollupCement, SmartRollupCommitment,
    SmartRollupExecuteOutboxMessage, SmartRollupOriginate, SmartRollupPublish,
    SmartRollupRecoverBond, SmartRollupRefute, SmartRollupTimeout,
};
pub use storage::IncreasePaidStorage;
pub use ticket::TransferTicket;
pub use transaction::Transaction;
pub use voting::{Ballot, BallotVote, Proposals};

use crate::error::{CodecError, Result};
use crate::kind::OpKind;
use crate::limits::Limits;
use crate::params::Params;
use crate::primitives::{Reader, Writer};
use serde::Serialize;
use serde_json::Value as Json;
use tzforge_crypto::PublicKeyHash;

/// Binary body of one operation variant, without its tag byte
pub trait OperationBody: Sized {
    /// Kind, and through it the tag byte
    const KIND: OpKind;

    /// Append the body to `w`
    fn encode_body(&self, w: &mut Writer, params: &Params) -> Result<()>;

    /// Read the body from `r`
    fn decode_body(r: &mut Reader<'_>, params: &Params) -> Result<Self>;

    /// Manager fields, for fee-paying variants
    fn manager(&self) -> Option<&ManagerFields> {
        None
    }

    /// Mutable manager fields, for fee-paying variants
    fn manager_mut(&mut self) -> Option<&mut ManagerFields> {
        None
    }
}

/// Implements the manager accessors of [`OperationBody`] for a struct with a
/// `manager: ManagerFields` field
macro_rules! manager_accessors {
    () => {
        fn manager(&self) -> Option<&$crate::operations::ManagerFields> {
            Some(&self.manager)
        }

        fn manager_mut(&mut self) -> Option<&mut $crate::operations::ManagerFields> {
            Some(&mut self.manager)
        }
    };
}

pub(crate) use manager_accessors;

/// Write the version-adjusted tag of `kind`
pub(crate) fn write_tag(w: &mut Writer, kind: OpKind, params: &Params) -> Result<()> {
    let version = params.operation_tags_version;
    let tag = kind
        .tag(version)
        .ok_or(CodecError::UnsupportedKind { kind, version })?;
    w.write_byte(tag);
    Ok(())
}

/// Consume the tag byte and check it belongs to `kind`
pub(crate) fn read_tag(r: &mut Reader<'_>, kind: OpKind, params: &Params) -> Result<()> {
    let version = params.operation_tags_version;
    let expected = kind
        .tag(version)
        .ok_or(CodecError::UnsupportedKind { kind, version })?;
    let actual = r.read_byte("tag")?;
    if actual != expected {
        return Err(CodecError::InvalidTag {
            kind,
            expected,
            actual,
        });
    }
    Ok(())
}

/// JSON of a single variant with its `kind` field
pub(crate) fn tagged_json<T: OperationBody + Serialize>(body: &T) -> serde_json::Result<Json> {
    let mut json = serde_json::to_value(body)?;
    if let Json::Object(map) = &mut json {
        map.insert("kind".to_string(), Json::String(T::KIND.name().to_string()));
    }
    Ok(json)
}

macro_rules! operations {
    ($($variant:ident),* $(,)?) => {
        /// One typed operation of any kind
        #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
        #[serde(tag = "kind", rename_all = "snake_case")]
        pub enum Operation {
            $( $variant($variant), )*
        }

        impl Operation {
            /// Kind of this operation
            #[must_use]
            pub const fn kind(&self) -> OpKind {
                match self {
                    $( Self::$variant(_) => OpKind::$variant, )*
                }
            }

            fn encode_body(&self, w: &mut Writer, params: &Params) -> Result<()> {
                match self {
                    $( Self::$variant(op) => op.encode_body(w, params), )*
                }
            }

            fn decode_body(kind: OpKind, r: &mut Reader<'_>, params: &Params) -> Result<Self> {
                match kind {
                    $( OpKind::$variant => $variant::decode_body(r, params).map(Self::$variant), )*
                }
            }

            /// Manager fields, for fee-paying kinds
            #[must_use]
            pub fn manager(&self) -> Option<&ManagerFields> {
                match self {
                    $( Self::$variant(op) => op.manager(), )*
                }
            }

            fn manager_mut(&mut self) -> Option<&mut ManagerFields> {
                match self {
                    $( Self::$variant(op) => op.manager_mut(), )*
                }
            }
        }

        $(
            impl From<$variant> for Operation {
                fn from(op: $variant) -> Self {
                    Self::$variant(op)
                }
            }
        )*
    };
}

operations!(
    Endorsement,
    EndorsementWithSlot,
    Attestation,
    Preattestation,
    SeedNonceRevelation,
    VdfRevelation,
    DoubleEndorsementEvidence,
    DoubleAttestationEvidence,
    DoublePreattestationEvidence,
    DoubleBakingEvidence,
    ActivateAccount,
    Proposals,
    Ballot,
    DrainDelegate,
    FailingNoop,
    DalAttestation,
    Reveal,
    Transaction,
    Origination,
    Delegation,
    RegisterGlobalConstant,
    SetDepositsLimit,
    IncreasePaidStorage,
    UpdateConsensusKey,
    TransferTicket,
    SmartRollupOriginate,
    SmartRollupAddMessages,
    SmartRollupCement,
    SmartRollupPublish,
    SmartRollupRefute,
    SmartRollupTimeout,
    SmartRollupExecuteOutboxMessage,
    SmartRollupRecoverBond,
    DalPublishCommitment,
);

impl Operation {
    /// Tag byte of this operation under `params`
    pub fn tag(&self, params: &Params) -> Result<u8> {
        let kind = self.kind();
        let version = params.operation_tags_version;
        kind.tag(version)
            .ok_or(CodecError::UnsupportedKind { kind, version })
    }

    /// Append tag and body to `w`
    pub fn encode(&self, w: &mut Writer, params: &Params) -> Result<()> {
        let kind = self.kind();
        write_tag(w, kind, params)
            .and_then(|()| self.encode_body(w, params))
            .map_err(|e| e.in_operation(kind))
    }

    /// Binary encoding of this single operation
    pub fn to_bytes(&self, params: &Params) -> Result<Vec<u8>> {
        let mut w = Writer::new();
        self.encode(&mut w, params)?;
        Ok(w.into_bytes())
    }

    /// Decode the next operation, choosing the variant from its tag byte
    pub fn decode(r: &mut Reader<'_>, params: &Params) -> Result<Self> {
        let tag = r.peek_byte().ok_or(CodecError::UnexpectedEof { field: "tag" })?;
        let version = params.operation_tags_version;
        let kind = OpKind::from_tag(tag, version).ok_or(CodecError::UnknownTag { tag, version })?;
        Self::decode_as(kind, r, params)
    }

    /// Decode an operation of a known kind, validating its tag byte
    pub fn decode_as(kind: OpKind, r: &mut Reader<'_>, params: &Params) -> Result<Self> {
        read_tag(r, kind, params)
            .and_then(|()| Self::decode_body(kind, r, params))
            .map_err(|e| e.in_operation(kind))
    }

    /// Node JSON form, with a `kind` field and string-encoded numbers
    pub fn to_json(&self) -> Result<Json> {
        Ok(serde_json::to_value(self)?)
    }

    /// True for fee-paying operations
    #[must_use]
    pub fn is_manager(&self) -> bool {
        self.kind().is_manager()
    }

    /// Current limits; zero for fee-less kinds
    #[must_use]
    pub fn limits(&self) -> Limits {
        self.manager().map(ManagerFields::limits).unwrap_or_default()
    }

    /// Counter of a manager operation, `None` for fee-less kinds
    ///
    /// `Some(0)` means the counter has not been assigned yet.
    #[must_use]
    pub fn counter(&self) -> Option<u64> {
        self.manager().map(|m| m.counter)
    }

    /// Source of a manager operation
    #[must_use]
    pub fn source(&self) -> Option<&PublicKeyHash> {
        self.manager().map(|m| &m.source)
    }

    /// Set the counter; no-op for fee-less kinds
    #[must_use]
    pub fn with_counter(mut self, counter: u64) -> Self {
        if let Some(m) = self.manager_mut() {
            m.counter = counter;
        }
        self
    }

    /// Set the source; no-op for fee-less kinds
    #[must_use]
    pub fn with_source(mut self, source: PublicKeyHash) -> Self {
        self.set_source(source);
        self
    }

    /// Set fee, gas and storage limit; no-op for fee-less kinds
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.set_limits(limits);
        self
    }

    pub(crate) fn set_source(&mut self, source: PublicKeyHash) {
        if let Some(m) = self.manager_mut() {
            m.source = source;
        }
    }

    pub(crate) fn set_limits(&mut self, limits: Limits) {
        if let Some(m) = self.manager_mut() {
            m.apply_limits(limits);
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Representative values shared by the variant tests

    use super::*;
    use tzforge_crypto::{Address, BlockHash, ContractHash, KeyKind, PublicKey, Signature};

    pub fn pkh(kind: KeyKind, fill: u8) -> PublicKeyHash {
        PublicKeyHash::new(kind, [fill; 20])
    }

    pub fn manager(fill: u8) -> ManagerFields {
        ManagerFields::new(pkh(KeyKind::Ed25519, fill))
            .with_counter(1_234_567)
            .with_limits(Limits {
                fee: 1_420,
                gas_limit: 10_600,
                storage_limit: 257,
            })
    }

    pub fn contract(fill: u8) -> Address {
        Address::Contract(ContractHash::new([fill; 20]))
    }

    pub fn public_key(kind: KeyKind) -> PublicKey {
        PublicKey::new(kind, &vec![0x42; kind.public_key_size()]).unwrap()
    }

    pub fn branch(fill: u8) -> BlockHash {
        BlockHash::new([fill; 32])
    }

    pub fn signature(fill: u8) -> Signature {
        Signature::from_bytes(&[fill; 64]).unwrap()
    }

    /// Encode then decode under `params`, asserting all bytes are consumed
    pub fn roundtrip(op: &Operation, params: &Params) -> Operation {
        let bytes = op.to_bytes(params).unwrap();
        let mut r = Reader::new(&bytes);
        let decoded = Operation::decode(&mut r, params).unwrap();
        assert!(r.is_empty(), "{} left {} bytes", op.kind(), r.remaining_len());
        assert_eq!(decoded.to_bytes(params).unwrap(), bytes);
        decoded
    }
}
