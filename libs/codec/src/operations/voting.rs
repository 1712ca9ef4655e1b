//! Amendment voting: proposals and ballots

use super::OperationBody;
use crate::error::{CodecError, Result};
use crate::kind::OpKind;
use crate::params::Params;
use crate::primitives::{Reader, Writer};
use serde::Serialize;
use tzforge_crypto::{ProtocolHash, PublicKeyHash};

/// Most proposals a single operation may carry
pub const MAX_PROPOSALS: usize = 20;

/// A ballot choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BallotVote {
    /// In favour
    Yay,
    /// Against
    Nay,
    /// Abstain
    Pass,
}

impl BallotVote {
    const fn to_byte(self) -> u8 {
        match self {
            Self::Yay => 0,
            Self::Nay => 1,
            Self::Pass => 2,
        }
    }

    fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(Self::Yay),
            1 => Ok(Self::Nay),
            2 => Ok(Self::Pass),
            other => Err(CodecError::InvalidValue {
                field: "ballot",
                value: u64::from(other),
            }),
        }
    }
}

/// Vote on the proposal under exploration or promotion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ballot {
    pub source: PublicKeyHash,
    pub period: i32,
    pub proposal: ProtocolHash,
    pub ballot: BallotVote,
}

impl Ballot {
    #[must_use]
    pub fn new(source: PublicKeyHash, period: i32, proposal: ProtocolHash, ballot: BallotVote) -> Self {
        Self {
            source,
            period,
            proposal,
            ballot,
        }
    }
}

impl OperationBody for Ballot {
    const KIND: OpKind = OpKind::Ballot;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        w.write_pkh(&self.source);
        w.write_i32(self.period);
        w.write_bytes(self.proposal.as_bytes());
        w.write_byte(self.ballot.to_byte());
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            source: r.read_pkh("source")?,
            period: r.read_i32("period")?,
            proposal: ProtocolHash::new(r.read_array("proposal")?),
            ballot: BallotVote::from_byte(r.read_byte("ballot")?)?,
        })
    }
}

/// Submit or upvote protocol proposals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Proposals {
    pub source: PublicKeyHash,
    pub period: i32,
    pub proposals: Vec<ProtocolHash>,
}

impl Proposals {
    #[must_use]
    pub fn new(source: PublicKeyHash, period: i32, proposals: Vec<ProtocolHash>) -> Self {
        Self {
            source,
            period,
            proposals,
        }
    }
}

impl OperationBody for Proposals {
    const KIND: OpKind = OpKind::Proposals;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        if self.proposals.len() > MAX_PROPOSALS {
            return Err(CodecError::LengthExceedsLimit {
                field: "proposals",
                len: self.proposals.len(),
                max: MAX_PROPOSALS,
            });
        }
        w.write_pkh(&self.source);
        w.write_i32(self.period);
        w.write_length(self.proposals.len() * ProtocolHash::SIZE, "proposals")?;
        for proposal in &self.proposals {
            w.write_bytes(proposal.as_bytes());
        }
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        let source = r.read_pkh("source")?;
        let period = r.read_i32("period")?;
        let mut list = r.read_sub("proposals")?;
        if list.remaining_len() % ProtocolHash::SIZE != 0 {
            return Err(CodecError::Malformed {
                field: "proposals",
                reason: format!("length {} is not a multiple of 32", list.remaining_len()),
            });
        }
        let count = list.remaining_len() / ProtocolHash::SIZE;
        if count > MAX_PROPOSALS {
            return Err(CodecError::LengthExceedsLimit {
                field: "proposals",
                len: count,
                max: MAX_PROPOSALS,
            });
        }
        let mut proposals = Vec::with_capacity(count);
        while !list.is_empty() {
            proposals.push(ProtocolHash::new(list.read_array("proposals")?));
        }
        Ok(Self {
            source,
            period,
            proposals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Operation;
    use crate::operations::fixtures::{pkh, roundtrip};
    use tzforge_crypto::KeyKind;

    #[test]
    fn test_ballot_layout_and_roundtrip() {
        let op: Operation = Ballot::new(
            pkh(KeyKind::Ed25519, 1),
            -3,
            ProtocolHash::new([9u8; 32]),
            BallotVote::Pass,
        )
        .into();
        let bytes = op.to_bytes(&Params::default()).unwrap();
        assert_eq!(bytes.len(), 1 + 21 + 4 + 32 + 1);
        assert_eq!(bytes[0], 6);
        assert_eq!(bytes[bytes.len() - 1], 2);
        assert_eq!(roundtrip(&op, &Params::default()), op);
        assert_eq!(op.to_json().unwrap()["ballot"], "pass");
    }

    #[test]
    fn test_invalid_vote_byte() {
        let op: Operation = Ballot::new(
            pkh(KeyKind::Ed25519, 1),
            1,
            ProtocolHash::new([9u8; 32]),
            BallotVote::Yay,
        )
        .into();
        let mut bytes = op.to_bytes(&Params::default()).unwrap();
        *bytes.last_mut().unwrap() = 3;
        let err = Operation::decode(&mut Reader::new(&bytes), &Params::default()).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            CodecError::InvalidValue { field: "ballot", value: 3 }
        ));
    }

    #[test]
    fn test_proposals_empty_and_max() {
        let empty: Operation = Proposals::new(pkh(KeyKind::Ed25519, 1), 7, vec![]).into();
        assert_eq!(roundtrip(&empty, &Params::default()), empty);

        let full: Operation = Proposals::new(
            pkh(KeyKind::Ed25519, 1),
            7,
            (0..20).map(|i| ProtocolHash::new([i; 32])).collect(),
        )
        .into();
        let bytes = full.to_bytes(&Params::default()).unwrap();
        assert_eq!(&bytes[26..30], &640u32.to_be_bytes());
        assert_eq!(roundtrip(&full, &Params::default()), full);

        let too_many: Operation = Proposals::new(
            pkh(KeyKind::Ed25519, 1),
            7,
            vec![ProtocolHash::new([0; 32]); 21],
        )
        .into();
        assert!(too_many.to_bytes(&Params::default()).is_err());
    }

    #[test]
    fn test_proposals_bad_length() {
        let mut bytes = vec![5u8];
        bytes.extend_from_slice(&pkh(KeyKind::Ed25519, 1).to_bytes());
        bytes.extend_from_slice(&1i32.to_be_bytes());
        bytes.extend_from_slice(&31u32.to_be_bytes());
        bytes.extend_from_slice(&[0u8; 31]);
        let err = Operation::decode(&mut Reader::new(&bytes), &Params::default()).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            CodecError::Malformed { field: "proposals", .. }
        ));
    }
}
