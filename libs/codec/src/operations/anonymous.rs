//! Fee-less operations that carry no manager fields and no consensus payload

use super::OperationBody;
use crate::error::{CodecError, Result};
use crate::kind::OpKind;
use crate::params::Params;
use crate::primitives::{Reader, Writer};
use serde::Serialize;
use tzforge_crypto::{KeyKind, PublicKeyHash};

/// Size of a VDF solution: two 100-byte class group elements
pub const VDF_SOLUTION_SIZE: usize = 200;

/// Activate a fundraiser account
///
/// The only place where an implicit account is written as a bare 20-byte hash;
/// the curve is always Ed25519.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivateAccount {
    pub pkh: PublicKeyHash,
    #[serde(with = "crate::json::hex_bytes")]
    pub secret: [u8; 20],
}

impl ActivateAccount {
    #[must_use]
    pub fn new(pkh: PublicKeyHash, secret: [u8; 20]) -> Self {
        Self { pkh, secret }
    }
}

impl OperationBody for ActivateAccount {
    const KIND: OpKind = OpKind::ActivateAccount;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        if self.pkh.kind() != KeyKind::Ed25519 {
            return Err(CodecError::InvalidValue {
                field: "pkh",
                value: u64::from(self.pkh.kind().tag()),
            });
        }
        w.write_bytes(self.pkh.hash());
        w.write_bytes(&self.secret);
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            pkh: PublicKeyHash::new(KeyKind::Ed25519, r.read_array("pkh")?),
            secret: r.read_array("secret")?,
        })
    }
}

/// Reveal the nonce committed to in an earlier block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedNonceRevelation {
    pub level: i32,
    #[serde(with = "crate::json::hex_bytes")]
    pub nonce: [u8; 32],
}

impl SeedNonceRevelation {
    #[must_use]
    pub fn new(level: i32, nonce: [u8; 32]) -> Self {
        Self { level, nonce }
    }
}

impl OperationBody for SeedNonceRevelation {
    const KIND: OpKind = OpKind::SeedNonceRevelation;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        w.write_i32(self.level);
        w.write_bytes(&self.nonce);
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            level: r.read_i32("level")?,
            nonce: r.read_array("nonce")?,
        })
    }
}

/// Publish the VDF solution for the current cycle's randomness
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VdfRevelation {
    #[serde(with = "crate::json::hex_bytes")]
    pub solution: [u8; VDF_SOLUTION_SIZE],
}

impl VdfRevelation {
    #[must_use]
    pub fn new(solution: [u8; VDF_SOLUTION_SIZE]) -> Self {
        Self { solution }
    }
}

impl OperationBody for VdfRevelation {
    const KIND: OpKind = OpKind::VdfRevelation;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        w.write_bytes(&self.solution);
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            solution: r.read_array("solution")?,
        })
    }
}

/// Move the full spendable balance of a delegate using its consensus key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrainDelegate {
    pub consensus_key: PublicKeyHash,
    pub delegate: PublicKeyHash,
    pub destination: PublicKeyHash,
}

impl DrainDelegate {
    #[must_use]
    pub fn new(
        consensus_key: PublicKeyHash,
        delegate: PublicKeyHash,
        destination: PublicKeyHash,
    ) -> Self {
        Self {
            consensus_key,
            delegate,
            destination,
        }
    }
}

impl OperationBody for DrainDelegate {
    const KIND: OpKind = OpKind::DrainDelegate;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        w.write_pkh(&self.consensus_key);
        w.write_pkh(&self.delegate);
        w.write_pkh(&self.destination);
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            consensus_key: r.read_pkh("consensus_key")?,
            delegate: r.read_pkh("delegate")?,
            destination: r.read_pkh("destination")?,
        })
    }
}

/// An operation that can never be included, used to sign arbitrary messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailingNoop {
    #[serde(with = "crate::json::hex_bytes")]
    pub arbitrary: Vec<u8>,
}

impl FailingNoop {
    #[must_use]
    pub fn new(arbitrary: impl Into<Vec<u8>>) -> Self {
        Self {
            arbitrary: arbitrary.into(),
        }
    }
}

impl OperationBody for FailingNoop {
    const KIND: OpKind = OpKind::FailingNoop;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        w.write_bytes_prefixed(&self.arbitrary, "arbitrary")
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            arbitrary: r.read_bytes_prefixed("arbitrary")?,
        })
    }
}
