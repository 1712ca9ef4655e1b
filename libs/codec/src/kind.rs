//! Operation kinds and the version-aware tag table
//!
//! The leading byte of every operation identifies its kind, but the numeric
//! value moved between protocol eras:
//!
//! - version 0: before Babylon, manager operations use tags 7..10
//! - version 1: Babylon to Hangzhou, manager operations moved to 107..110
//! - version 2: Ithaca and later (Tenderbake consensus)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest tags version this crate knows about
pub const LATEST_TAGS_VERSION: u8 = 2;

/// Every operation kind that can be encoded or decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// Pre-Tenderbake endorsement (legacy)
    Endorsement,
    /// Endorsement wrapped with its slot (legacy)
    EndorsementWithSlot,
    /// Tenderbake attestation
    Attestation,
    /// Tenderbake preattestation
    Preattestation,
    /// Seed nonce revelation
    SeedNonceRevelation,
    /// VDF revelation
    VdfRevelation,
    /// Double endorsement evidence (legacy)
    DoubleEndorsementEvidence,
    /// Double attestation evidence
    DoubleAttestationEvidence,
    /// Double preattestation evidence
    DoublePreattestationEvidence,
    /// Double baking evidence
    DoubleBakingEvidence,
    /// Fundraiser account activation
    ActivateAccount,
    /// Protocol amendment proposals
    Proposals,
    /// Protocol amendment ballot
    Ballot,
    /// Drain a delegate through its consensus key
    DrainDelegate,
    /// Never-valid operation used to sign arbitrary messages
    FailingNoop,
    /// DAL attestation
    DalAttestation,
    /// Public key revelation
    Reveal,
    /// Transaction
    Transaction,
    /// Contract origination
    Origination,
    /// Delegation
    Delegation,
    /// Register a global constant
    RegisterGlobalConstant,
    /// Set a frozen deposits limit
    SetDepositsLimit,
    /// Increase paid storage of a contract
    IncreasePaidStorage,
    /// Update consensus key
    UpdateConsensusKey,
    /// Transfer tickets
    TransferTicket,
    /// Originate a smart rollup
    SmartRollupOriginate,
    /// Add messages to the smart rollup inbox
    SmartRollupAddMessages,
    /// Cement a smart rollup commitment
    SmartRollupCement,
    /// Publish a smart rollup commitment
    SmartRollupPublish,
    /// Start or continue a refutation game
    SmartRollupRefute,
    /// End a refutation game on timeout
    SmartRollupTimeout,
    /// Execute a smart rollup outbox message
    SmartRollupExecuteOutboxMessage,
    /// Recover a smart rollup bond
    SmartRollupRecoverBond,
    /// Publish a DAL slot commitment
    DalPublishCommitment,
}

// (kind, v0, v1, v2)
const TAG_TABLE: &[(OpKind, Option<u8>, Option<u8>, Option<u8>)] = &[
    (OpKind::Endorsement, Some(0), Some(0), None),
    (OpKind::SeedNonceRevelation, Some(1), Some(1), Some(1)),
    (OpKind::DoubleEndorsementEvidence, Some(2), Some(2), None),
    (OpKind::DoubleAttestationEvidence, None, None, Some(2)),
    (OpKind::DoubleBakingEvidence, Some(3), Some(3), Some(3)),
    (OpKind::ActivateAccount, Some(4), Some(4), Some(4)),
    (OpKind::Proposals, Some(5), Some(5), Some(5)),
    (OpKind::Ballot, Some(6), Some(6), Some(6)),
    (OpKind::Reveal, Some(7), Some(107), Some(107)),
    (OpKind::DoublePreattestationEvidence, None, None, Some(7)),
    (OpKind::Transaction, Some(8), Some(108), Some(108)),
    (OpKind::VdfRevelation, None, None, Some(8)),
    (OpKind::Origination, Some(9), Some(109), Some(109)),
    (OpKind::DrainDelegate, None, None, Some(9)),
    (OpKind::Delegation, Some(10), Some(110), Some(110)),
    (OpKind::EndorsementWithSlot, None, Some(10), None),
    (OpKind::FailingNoop, None, Some(17), Some(17)),
    (OpKind::Preattestation, None, None, Some(20)),
    (OpKind::Attestation, None, None, Some(21)),
    (OpKind::DalAttestation, None, None, Some(22)),
    (OpKind::RegisterGlobalConstant, None, Some(111), Some(111)),
    (OpKind::SetDepositsLimit, None, None, Some(112)),
    (OpKind::IncreasePaidStorage, None, None, Some(113)),
    (OpKind::UpdateConsensusKey, None, None, Some(114)),
    (OpKind::TransferTicket, None, None, Some(158)),
    (OpKind::SmartRollupOriginate, None, None, Some(200)),
    (OpKind::SmartRollupAddMessages, None, None, Some(201)),
    (OpKind::SmartRollupCement, None, None, Some(202)),
    (OpKind::SmartRollupPublish, None, None, Some(203)),
    (OpKind::SmartRollupRefute, None, None, Some(204)),
    (OpKind::SmartRollupTimeout, None, None, Some(205)),
    (OpKind::SmartRollupExecuteOutboxMessage, None, None, Some(206)),
    (OpKind::SmartRollupRecoverBond, None, None, Some(207)),
    (OpKind::DalPublishCommitment, None, None, Some(230)),
];

fn column(entry: &(OpKind, Option<u8>, Option<u8>, Option<u8>), version: u8) -> Option<u8> {
    match version {
        0 => entry.1,
        1 => entry.2,
        _ => entry.3,
    }
}

impl OpKind {
    /// Tag byte of this kind in the given tags version
    ///
    /// Versions above [`LATEST_TAGS_VERSION`] use the latest table.
    #[must_use]
    pub fn tag(self, version: u8) -> Option<u8> {
        TAG_TABLE
            .iter()
            .find(|entry| entry.0 == self)
            .and_then(|entry| column(entry, version))
    }

    /// Kind identified by `tag` in the given tags version
    #[must_use]
    pub fn from_tag(tag: u8, version: u8) -> Option<Self> {
        TAG_TABLE
            .iter()
            .find(|entry| column(entry, version) == Some(tag))
            .map(|entry| entry.0)
    }

    /// Name used by the node in JSON and RPC
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Endorsement => "endorsement",
            Self::EndorsementWithSlot => "endorsement_with_slot",
            Self::Attestation => "attestation",
            Self::Preattestation => "preattestation",
            Self::SeedNonceRevelation => "seed_nonce_revelation",
            Self::VdfRevelation => "vdf_revelation",
            Self::DoubleEndorsementEvidence => "double_endorsement_evidence",
            Self::DoubleAttestationEvidence => "double_attestation_evidence",
            Self::DoublePreattestationEvidence => "double_preattestation_evidence",
            Self::DoubleBakingEvidence => "double_baking_evidence",
            Self::ActivateAccount => "activate_account",
            Self::Proposals => "proposals",
            Self::Ballot => "ballot",
            Self::DrainDelegate => "drain_delegate",
            Self::FailingNoop => "failing_noop",
            Self::DalAttestation => "dal_attestation",
            Self::Reveal => "reveal",
            Self::Transaction => "transaction",
            Self::Origination => "origination",
            Self::Delegation => "delegation",
            Self::RegisterGlobalConstant => "register_global_constant",
            Self::SetDepositsLimit => "set_deposits_limit",
            Self::IncreasePaidStorage => "increase_paid_storage",
            Self::UpdateConsensusKey => "update_consensus_key",
            Self::TransferTicket => "transfer_ticket",
            Self::SmartRollupOriginate => "smart_rollup_originate",
            Self::SmartRollupAddMessages => "smart_rollup_add_messages",
            Self::SmartRollupCement => "smart_rollup_cement",
            Self::SmartRollupPublish => "smart_rollup_publish",
            Self::SmartRollupRefute => "smart_rollup_refute",
            Self::SmartRollupTimeout => "smart_rollup_timeout",
            Self::SmartRollupExecuteOutboxMessage => "smart_rollup_execute_outbox_message",
            Self::SmartRollupRecoverBond => "smart_rollup_recover_bond",
            Self::DalPublishCommitment => "dal_publish_commitment",
        }
    }

    /// True for kinds that carry manager fields (fee, counter, limits)
    #[must_use]
    pub const fn is_manager(self) -> bool {
        matches!(
            self,
            Self::Reveal
                | Self::Transaction
                | Self::Origination
                | Self::Delegation
                | Self::RegisterGlobalConstant
                | Self::SetDepositsLimit
                | Self::IncreasePaidStorage
                | Self::UpdateConsensusKey
                | Self::TransferTicket
                | Self::SmartRollupOriginate
                | Self::SmartRollupAddMessages
                | Self::SmartRollupCement
                | Self::SmartRollupPublish
                | Self::SmartRollupRefute
                | Self::SmartRollupTimeout
                | Self::SmartRollupExecuteOutboxMessage
                | Self::SmartRollupRecoverBond
                | Self::DalPublishCommitment
        )
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
