//! Data-availability layer operations

use super::{ManagerFields, OperationBody, manager_accessors};
use crate::error::Result;
use crate::kind::OpKind;
use crate::params::Params;
use crate::primitives::{Reader, Writer};
use serde::Serialize;
use tzforge_crypto::{DalCommitment, PublicKeyHash};

/// Size of a DAL commitment proof
pub const DAL_PROOF_SIZE: usize = 96;

/// Publish the commitment of a DAL slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DalPublishCommitment {
    #[serde(flatten)]
    pub manager: ManagerFields,
    pub slot_index: u8,
    pub commitment: DalCommitment,
    #[serde(with = "crate::json::hex_bytes")]
    pub commitment_proof: [u8; DAL_PROOF_SIZE],
}

impl DalPublishCommitment {
    #[must_use]
    pub fn new(
        manager: ManagerFields,
        slot_index: u8,
        commitment: DalCommitment,
        commitment_proof: [u8; DAL_PROOF_SIZE],
    ) -> Self {
        Self {
            manager,
            slot_index,
            commitment,
            commitment_proof,
        }
    }
}

impl OperationBody for DalPublishCommitment {
    const KIND: OpKind = OpKind::DalPublishCommitment;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        self.manager.encode(w);
        w.write_byte(self.slot_index);
        w.write_bytes(self.commitment.as_bytes());
        w.write_bytes(&self.commitment_proof);
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            manager: ManagerFields::decode(r)?,
            slot_index: r.read_byte("slot_index")?,
            commitment: DalCommitment::new(r.read_array("commitment")?),
            commitment_proof: r.read_array("commitment_proof")?,
        })
    }

    manager_accessors!();
}

/// Attest the availability of DAL slots at `level`
///
/// `attestation` is a bitset over slot indexes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DalAttestation {
    pub attestor: PublicKeyHash,
    #[serde(with = "crate::json::string")]
    pub attestation: i64,
    pub level: i32,
}

impl DalAttestation {
    #[must_use]
    pub fn new(attestor: PublicKeyHash, attestation: i64, level: i32) -> Self {
        Self {
            attestor,
            attestation,
            level,
        }
    }
}

impl OperationBody for DalAttestation {
    const KIND: OpKind = OpKind::DalAttestation;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        w.write_pkh(&self.attestor);
        w.write_z(self.attestation);
        w.write_i32(self.level);
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            attestor: r.read_pkh("attestor")?,
            attestation: r.read_z("attestation")?,
            level: r.read_i32("level")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Operation;
    use crate::operations::fixtures::{manager, pkh, roundtrip};
    use tzforge_crypto::KeyKind;

    #[test]
    fn test_publish_commitment() {
        let op: Operation = DalPublishCommitment::new(
            manager(1),
            4,
            DalCommitment::new([0x11; 48]),
            [0x22; DAL_PROOF_SIZE],
        )
        .into();
        let bytes = op.to_bytes(&Params::default()).unwrap();
        assert_eq!(bytes[0], 230);
        assert_eq!(bytes.len(), 31 + 1 + 48 + 96);
        assert_eq!(roundtrip(&op, &Params::default()), op);
    }

    #[test]
    fn test_dal_attestation() {
        let op: Operation = DalAttestation::new(pkh(KeyKind::Bls12_381, 1), 0b1011, 123).into();
        let bytes = op.to_bytes(&Params::default()).unwrap();
        assert_eq!(bytes[0], 22);
        assert_eq!(&bytes[22..], &[0x0b, 0, 0, 0, 123]);
        assert_eq!(roundtrip(&op, &Params::default()), op);
        assert!(!op.is_manager());
        assert_eq!(op.to_json().unwrap()["attestation"], "11");
    }
}
