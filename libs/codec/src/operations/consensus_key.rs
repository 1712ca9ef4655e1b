use super::{ManagerFields, OperationBody, manager_accessors};
use crate::error::Result;
use crate::kind::OpKind;
use crate::params::Params;
use crate::primitives::{Reader, Writer};
use serde::Serialize;
use tzforge_crypto::PublicKey;

/// Rotate the key a delegate signs blocks and attestations with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateConsensusKey {
    #[serde(flatten)]
    pub manager: ManagerFields,
    pub pk: PublicKey,
}

impl UpdateConsensusKey {
    #[must_use]
    pub fn new(manager: ManagerFields, pk: PublicKey) -> Self {
        Self { manager, pk }
    }
}

impl OperationBody for UpdateConsensusKey {
    const KIND: OpKind = OpKind::UpdateConsensusKey;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        self.manager.encode(w);
        w.write_public_key(&self.pk);
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            manager: ManagerFields::decode(r)?,
            pk: r.read_public_key("pk")?,
        })
    }

    manager_accessors!();
}
