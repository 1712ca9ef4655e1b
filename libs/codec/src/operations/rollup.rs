//! Smart rollup operations
//!
//! Rollups are referenced by their bare 20-byte address hash. Refutation
//! games nest several tagged unions; each one is a Rust enum with its own
//! `encode`/`decode` pair and a `*_kind` JSON discriminator.

use super::{ManagerFields, OperationBody, manager_accessors};
use crate::error::{CodecError, Result};
use crate::kind::OpKind;
use crate::params::Params;
use crate::primitives::{Reader, Writer};
use crate::value::Value;
use serde::Serialize;
use tzforge_crypto::{
    PublicKeyHash, SmartRollupAddress, SmartRollupCommitmentHash, SmartRollupStateHash,
};

fn read_rollup(r: &mut Reader<'_>) -> Result<SmartRollupAddress> {
    Ok(SmartRollupAddress::new(r.read_array("rollup")?))
}

fn unknown_tag(field: &'static str, tag: u8) -> CodecError {
    CodecError::InvalidValue {
        field,
        value: u64::from(tag),
    }
}

/// Proof-generating virtual machine of a rollup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PvmKind {
    Arith,
    #[serde(rename = "wasm_2_0_0")]
    Wasm,
    Riscv,
}

impl PvmKind {
    const fn to_byte(self) -> u8 {
        match self {
            Self::Arith => 0,
            Self::Wasm => 1,
            Self::Riscv => 2,
        }
    }

    fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(Self::Arith),
            1 => Ok(Self::Wasm),
            2 => Ok(Self::Riscv),
            other => Err(unknown_tag("pvm_kind", other)),
        }
    }
}

/// Deploy a new smart rollup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmartRollupOriginate {
    #[serde(flatten)]
    pub manager: ManagerFields,
    pub pvm_kind: PvmKind,
    #[serde(with = "crate::json::hex_bytes")]
    pub kernel: Vec<u8>,
    #[serde(with = "crate::json::hex_bytes")]
    pub origination_proof: Vec<u8>,
    pub parameters_ty: Value,
}

impl SmartRollupOriginate {
    #[must_use]
    pub fn new(
        manager: ManagerFields,
        pvm_kind: PvmKind,
        kernel: Vec<u8>,
        origination_proof: Vec<u8>,
        parameters_ty: Value,
    ) -> Self {
        Self {
            manager,
            pvm_kind,
            kernel,
            origination_proof,
            parameters_ty,
        }
    }
}

impl OperationBody for SmartRollupOriginate {
    const KIND: OpKind = OpKind::SmartRollupOriginate;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        self.manager.encode(w);
        w.write_byte(self.pvm_kind.to_byte());
        w.write_bytes_prefixed(&self.kernel, "kernel")?;
        w.write_bytes_prefixed(&self.origination_proof, "origination_proof")?;
        self.parameters_ty.encode_prefixed(w, "parameters_ty")
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            manager: ManagerFields::decode(r)?,
            pvm_kind: PvmKind::from_byte(r.read_byte("pvm_kind")?)?,
            kernel: r.read_bytes_prefixed("kernel")?,
            origination_proof: r.read_bytes_prefixed("origination_proof")?,
            parameters_ty: Value::decode_prefixed(r, "parameters_ty")?,
        })
    }

    manager_accessors!();
}

/// Append messages to the shared rollup inbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmartRollupAddMessages {
    #[serde(flatten)]
    pub manager: ManagerFields,
    #[serde(rename = "message", serialize_with = "crate::json::hex_list::serialize")]
    pub messages: Vec<Vec<u8>>,
}

impl SmartRollupAddMessages {
    #[must_use]
    pub fn new(manager: ManagerFields, messages: Vec<Vec<u8>>) -> Self {
        Self { manager, messages }
    }
}

impl OperationBody for SmartRollupAddMessages {
    const KIND: OpKind = OpKind::SmartRollupAddMessages;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        self.manager.encode(w);
        w.write_sub("message", |w| {
            self.messages
                .iter()
                .try_for_each(|message| w.write_bytes_prefixed(message, "message"))
        })
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        let manager = ManagerFields::decode(r)?;
        let mut list = r.read_sub("message")?;
        let mut messages = Vec::new();
        while !list.is_empty() {
            messages.push(list.read_bytes_prefixed("message")?);
        }
        Ok(Self { manager, messages })
    }

    manager_accessors!();
}

/// Cement the oldest commitment once its refutation period is over
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmartRollupCement {
    #[serde(flatten)]
    pub manager: ManagerFields,
    pub rollup: SmartRollupAddress,
}

impl SmartRollupCement {
    #[must_use]
    pub fn new(manager: ManagerFields, rollup: SmartRollupAddress) -> Self {
        Self { manager, rollup }
    }
}

impl OperationBody for SmartRollupCement {
    const KIND: OpKind = OpKind::SmartRollupCement;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        self.manager.encode(w);
        w.write_bytes(self.rollup.as_bytes());
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            manager: ManagerFields::decode(r)?,
            rollup: read_rollup(r)?,
        })
    }

    manager_accessors!();
}

/// Claimed rollup state after processing an inbox level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmartRollupCommitment {
    pub compressed_state: SmartRollupStateHash,
    pub inbox_level: i32,
    pub predecessor: SmartRollupCommitmentHash,
    #[serde(with = "crate::json::string")]
    pub number_of_ticks: i64,
}

impl SmartRollupCommitment {
    fn encode(&self, w: &mut Writer) {
        w.write_bytes(self.compressed_state.as_bytes());
        w.write_i32(self.inbox_level);
        w.write_bytes(self.predecessor.as_bytes());
        w.write_i64(self.number_of_ticks);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            compressed_state: SmartRollupStateHash::new(r.read_array("compressed_state")?),
            inbox_level: r.read_i32("inbox_level")?,
            predecessor: SmartRollupCommitmentHash::new(r.read_array("predecessor")?),
            number_of_ticks: r.read_i64("number_of_ticks")?,
        })
    }
}

/// Stake on a commitment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmartRollupPublish {
    #[serde(flatten)]
    pub manager: ManagerFields,
    pub rollup: SmartRollupAddress,
    pub commitment: SmartRollupCommitment,
}

impl SmartRollupPublish {
    #[must_use]
    pub fn new(
        manager: ManagerFields,
        rollup: SmartRollupAddress,
        commitment: SmartRollupCommitment,
    ) -> Self {
        Self {
            manager,
            rollup,
            commitment,
        }
    }
}

impl OperationBody for SmartRollupPublish {
    const KIND: OpKind = OpKind::SmartRollupPublish;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        self.manager.encode(w);
        w.write_bytes(self.rollup.as_bytes());
        self.commitment.encode(w);
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            manager: ManagerFields::decode(r)?,
            rollup: read_rollup(r)?,
            commitment: SmartRollupCommitment::decode(r)?,
        })
    }

    manager_accessors!();
}

/// One section boundary of a dissection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DissectionChunk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<SmartRollupStateHash>,
    #[serde(with = "crate::json::string")]
    pub tick: u64,
}

/// Split of a disputed tick range into sections
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Dissection {
    pub chunks: Vec<DissectionChunk>,
}

impl Dissection {
    fn encode(&self, w: &mut Writer) -> Result<()> {
        w.write_sub("dissection", |w| {
            for chunk in &self.chunks {
                w.write_option(chunk.state.as_ref(), |w, state| w.write_bytes(state.as_bytes()));
                w.write_n(chunk.tick);
            }
            Ok(())
        })
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let mut list = r.read_sub("dissection")?;
        let mut chunks = Vec::new();
        while !list.is_empty() {
            chunks.push(DissectionChunk {
                state: list.read_option("state", |r| {
                    Ok(SmartRollupStateHash::new(r.read_array("state")?))
                })?,
                tick: list.read_n("tick")?,
            });
        }
        Ok(Self { chunks })
    }
}

/// Proof that a page or preimage revealed to the PVM is genuine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reveal_proof_kind", rename_all = "snake_case")]
pub enum RevealProof {
    RawDataProof {
        #[serde(with = "crate::json::hex_bytes")]
        raw_data: Vec<u8>,
    },
    MetadataProof,
    DalPageProof {
        published_level: i32,
        slot_index: u8,
        page_index: i16,
        #[serde(with = "crate::json::hex_bytes")]
        dal_proof: Vec<u8>,
    },
    DalParametersProof,
}

impl RevealProof {
    fn encode(&self, w: &mut Writer) -> Result<()> {
        match self {
            Self::RawDataProof { raw_data } => {
                w.write_byte(0);
                let len = u16::try_from(raw_data.len()).map_err(|_| CodecError::LengthExceedsLimit {
                    field: "raw_data",
                    len: raw_data.len(),
                    max: usize::from(u16::MAX),
                })?;
                w.write_u16(len);
                w.write_bytes(raw_data);
            }
            Self::MetadataProof => w.write_byte(1),
            Self::DalPageProof {
                published_level,
                slot_index,
                page_index,
                dal_proof,
            } => {
                w.write_byte(2);
                w.write_i32(*published_level);
                w.write_byte(*slot_index);
                w.write_i16(*page_index);
                w.write_bytes_prefixed(dal_proof, "dal_proof")?;
            }
            Self::DalParametersProof => w.write_byte(3),
        }
        Ok(())
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        match r.read_byte("reveal_proof_kind")? {
            0 => {
                let len = r.read_u16("raw_data")?;
                Ok(Self::RawDataProof {
                    raw_data: r.read_bytes(usize::from(len), "raw_data")?.to_vec(),
                })
            }
            1 => Ok(Self::MetadataProof),
            2 => Ok(Self::DalPageProof {
                published_level: r.read_i32("published_level")?,
                slot_index: r.read_byte("slot_index")?,
                page_index: r.read_i16("page_index")?,
                dal_proof: r.read_bytes_prefixed("dal_proof")?,
            }),
            3 => Ok(Self::DalParametersProof),
            tag => Err(unknown_tag("reveal_proof_kind", tag)),
        }
    }
}

/// Proof of the input consumed by the disputed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "input_proof_kind", rename_all = "snake_case")]
pub enum InputProof {
    InboxProof {
        level: i32,
        #[serde(with = "crate::json::string")]
        message_counter: u64,
        #[serde(with = "crate::json::hex_bytes")]
        serialized_proof: Vec<u8>,
    },
    RevealProof {
        reveal_proof: RevealProof,
    },
    FirstInput,
}

impl InputProof {
    fn encode(&self, w: &mut Writer) -> Result<()> {
        match self {
            Self::InboxProof {
                level,
                message_counter,
                serialized_proof,
            } => {
                w.write_byte(0);
                w.write_i32(*level);
                w.write_n(*message_counter);
                w.write_bytes_prefixed(serialized_proof, "serialized_proof")
            }
            Self::RevealProof { reveal_proof } => {
                w.write_byte(1);
                reveal_proof.encode(w)
            }
            Self::FirstInput => {
                w.write_byte(2);
                Ok(())
            }
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        match r.read_byte("input_proof_kind")? {
            0 => Ok(Self::InboxProof {
                level: r.read_i32("level")?,
                message_counter: r.read_n("message_counter")?,
                serialized_proof: r.read_bytes_prefixed("serialized_proof")?,
            }),
            1 => Ok(Self::RevealProof {
                reveal_proof: RevealProof::decode(r)?,
            }),
            2 => Ok(Self::FirstInput),
            tag => Err(unknown_tag("input_proof_kind", tag)),
        }
    }
}

/// The step played in a refutation move
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RefutationMove {
    Dissection(Dissection),
    Proof {
        #[serde(with = "crate::json::hex_bytes")]
        pvm_step: Vec<u8>,
        #[serde(skip_serializing_if = "Option::is_none")]
        input_proof: Option<InputProof>,
    },
}

impl RefutationMove {
    fn encode(&self, w: &mut Writer) -> Result<()> {
        match self {
            Self::Dissection(dissection) => {
                w.write_byte(0);
                dissection.encode(w)
            }
            Self::Proof {
                pvm_step,
                input_proof,
            } => {
                w.write_byte(1);
                w.write_bytes_prefixed(pvm_step, "pvm_step")?;
                match input_proof {
                    Some(proof) => {
                        w.write_bool(true);
                        proof.encode(w)
                    }
                    None => {
                        w.write_bool(false);
                        Ok(())
                    }
                }
            }
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        match r.read_byte("step")? {
            0 => Ok(Self::Dissection(Dissection::decode(r)?)),
            1 => Ok(Self::Proof {
                pvm_step: r.read_bytes_prefixed("pvm_step")?,
                input_proof: r.read_option("input_proof", InputProof::decode)?,
            }),
            tag => Err(unknown_tag("step", tag)),
        }
    }
}

/// A move in a refutation game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "refutation_kind", rename_all = "snake_case")]
pub enum Refutation {
    Start {
        player_commitment_hash: SmartRollupCommitmentHash,
        opponent_commitment_hash: SmartRollupCommitmentHash,
    },
    Move {
        #[serde(with = "crate::json::string")]
        choice: u64,
        step: RefutationMove,
    },
}

impl Refutation {
    fn encode(&self, w: &mut Writer) -> Result<()> {
        match self {
            Self::Start {
                player_commitment_hash,
                opponent_commitment_hash,
            } => {
                w.write_byte(0);
                w.write_bytes(player_commitment_hash.as_bytes());
                w.write_bytes(opponent_commitment_hash.as_bytes());
                Ok(())
            }
            Self::Move { choice, step } => {
                w.write_byte(1);
                w.write_n(*choice);
                step.encode(w)
            }
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        match r.read_byte("refutation_kind")? {
            0 => Ok(Self::Start {
                player_commitment_hash: SmartRollupCommitmentHash::new(
                    r.read_array("player_commitment_hash")?,
                ),
                opponent_commitment_hash: SmartRollupCommitmentHash::new(
                    r.read_array("opponent_commitment_hash")?,
                ),
            }),
            1 => Ok(Self::Move {
                choice: r.read_n("choice")?,
                step: RefutationMove::decode(r)?,
            }),
            tag => Err(unknown_tag("refutation_kind", tag)),
        }
    }
}

/// Start or continue a refutation game against a staker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmartRollupRefute {
    #[serde(flatten)]
    pub manager: ManagerFields,
    pub rollup: SmartRollupAddress,
    pub opponent: PublicKeyHash,
    pub refutation: Refutation,
}

impl SmartRollupRefute {
    #[must_use]
    pub fn new(
        manager: ManagerFields,
        rollup: SmartRollupAddress,
        opponent: PublicKeyHash,
        refutation: Refutation,
    ) -> Self {
        Self {
            manager,
            rollup,
            opponent,
            refutation,
        }
    }
}

impl OperationBody for SmartRollupRefute {
    const KIND: OpKind = OpKind::SmartRollupRefute;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        self.manager.encode(w);
        w.write_bytes(self.rollup.as_bytes());
        w.write_pkh(&self.opponent);
        self.refutation.encode(w)
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            manager: ManagerFields::decode(r)?,
            rollup: read_rollup(r)?,
            opponent: r.read_pkh("opponent")?,
            refutation: Refutation::decode(r)?,
        })
    }

    manager_accessors!();
}

/// End a refutation game whose current player ran out of time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmartRollupTimeout {
    #[serde(flatten)]
    pub manager: ManagerFields,
    pub rollup: SmartRollupAddress,
    pub alice: PublicKeyHash,
    pub bob: PublicKeyHash,
}

impl SmartRollupTimeout {
    #[must_use]
    pub fn new(
        manager: ManagerFields,
        rollup: SmartRollupAddress,
        alice: PublicKeyHash,
        bob: PublicKeyHash,
    ) -> Self {
        Self {
            manager,
            rollup,
            alice,
            bob,
        }
    }
}

impl OperationBody for SmartRollupTimeout {
    const KIND: OpKind = OpKind::SmartRollupTimeout;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        self.manager.encode(w);
        w.write_bytes(self.rollup.as_bytes());
        w.write_pkh(&self.alice);
        w.write_pkh(&self.bob);
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            manager: ManagerFields::decode(r)?,
            rollup: read_rollup(r)?,
            alice: r.read_pkh("alice")?,
            bob: r.read_pkh("bob")?,
        })
    }

    manager_accessors!();
}

/// Execute an outbox message of a cemented commitment on layer 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmartRollupExecuteOutboxMessage {
    #[serde(flatten)]
    pub manager: ManagerFields,
    pub rollup: SmartRollupAddress,
    pub cemented_commitment: SmartRollupCommitmentHash,
    #[serde(with = "crate::json::hex_bytes")]
    pub output_proof: Vec<u8>,
}

impl SmartRollupExecuteOutboxMessage {
    #[must_use]
    pub fn new(
        manager: ManagerFields,
        rollup: SmartRollupAddress,
        cemented_commitment: SmartRollupCommitmentHash,
        output_proof: Vec<u8>,
    ) -> Self {
        Self {
            manager,
            rollup,
            cemented_commitment,
            output_proof,
        }
    }
}

impl OperationBody for SmartRollupExecuteOutboxMessage {
    const KIND: OpKind = OpKind::SmartRollupExecuteOutboxMessage;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        self.manager.encode(w);
        w.write_bytes(self.rollup.as_bytes());
        w.write_bytes(self.cemented_commitment.as_bytes());
        w.write_bytes_prefixed(&self.output_proof, "output_proof")
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            manager: ManagerFields::decode(r)?,
            rollup: read_rollup(r)?,
            cemented_commitment: SmartRollupCommitmentHash::new(r.read_array("cemented_commitment")?),
            output_proof: r.read_bytes_prefixed("output_proof")?,
        })
    }

    manager_accessors!();
}

/// Reclaim the bond of a staker with no pending commitments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmartRollupRecoverBond {
    #[serde(flatten)]
    pub manager: ManagerFields,
    pub rollup: SmartRollupAddress,
    pub staker: PublicKeyHash,
}

impl SmartRollupRecoverBond {
    #[must_use]
    pub fn new(manager: ManagerFields, rollup: SmartRollupAddress, staker: PublicKeyHash) -> Self {
        Self {
            manager,
            rollup,
            staker,
        }
    }
}

impl OperationBody for SmartRollupRecoverBond {
    const KIND: OpKind = OpKind::SmartRollupRecoverBond;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        self.manager.encode(w);
        w.write_bytes(self.rollup.as_bytes());
        w.write_pkh(&self.staker);
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            manager: ManagerFields::decode(r)?,
            rollup: read_rollup(r)?,
            staker: r.read_pkh("staker")?,
        })
    }

    manager_accessors!();
}
