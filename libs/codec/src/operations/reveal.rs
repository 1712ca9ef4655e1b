use super::{ManagerFields, OperationBody, manager_accessors};
use crate::error::Result;
use crate::kind::OpKind;
use crate::params::Params;
use crate::primitives::{Reader, Writer};
use serde::Serialize;
use tzforge_crypto::PublicKey;

/// Publish the public key of an implicit account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reveal {
    #[serde(flatten)]
    pub manager: ManagerFields,
    pub public_key: PublicKey,
}

impl Reveal {
    #[must_use]
    pub fn new(manager: ManagerFields, public_key: PublicKey) -> Self {
        Self {
            manager,
            public_key,
        }
    }
}

impl OperationBody for Reveal {
    const KIND: OpKind = OpKind::Reveal;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        self.manager.encode(w);
        w.write_public_key(&self.public_key);
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            manager: ManagerFields::decode(r)?,
            public_key: r.read_public_key("public_key")?,
        })
    }

    manager_accessors!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Operation;
    use crate::operations::fixtures::{manager, public_key, roundtrip};
    use tzforge_crypto::KeyKind;

    #[test]
    fn test_roundtrip_every_curve() {
        for kind in KeyKind::ALL {
            let op: Operation = Reveal::new(manager(3), public_key(kind)).into();
            let bytes = op.to_bytes(&Params::default()).unwrap();
            assert_eq!(bytes.len(), 31 + 1 + kind.public_key_size());
            assert_eq!(roundtrip(&op, &Params::default()), op);
        }
    }

    #[test]
    fn test_json_public_key_text() {
        let op: Operation = Reveal::new(manager(3), public_key(KeyKind::Ed25519)).into();
        let json = op.to_json().unwrap();
        assert!(json["public_key"].as_str().unwrap().starts_with("edpk"));
    }
}
