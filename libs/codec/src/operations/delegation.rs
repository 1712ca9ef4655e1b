use super::{ManagerFields, OperationBody, manager_accessors};
use crate::error::Result;
use crate::kind::OpKind;
use crate::params::Params;
use crate::primitives::{Reader, Writer};
use serde::Serialize;
use tzforge_crypto::PublicKeyHash;

/// Set, change or withdraw the delegate of the source
///
/// Delegating to oneself registers the source as a baker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delegation {
    #[serde(flatten)]
    pub manager: ManagerFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegate: Option<PublicKeyHash>,
}

impl Delegation {
    #[must_use]
    pub fn new(manager: ManagerFields, delegate: Option<PublicKeyHash>) -> Self {
        Self { manager, delegate }
    }
}

impl OperationBody for Delegation {
    const KIND: OpKind = OpKind::Delegation;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        self.manager.encode(w);
        w.write_option(self.delegate.as_ref(), Writer::write_pkh);
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            manager: ManagerFields::decode(r)?,
            delegate: r.read_option("delegate", |r| r.read_pkh("delegate"))?,
        })
    }

    manager_accessors!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::operations::Operation;
    use crate::operations::fixtures::{manager, pkh, roundtrip};
    use tzforge_crypto::KeyKind;

    #[test]
    fn test_delegate_and_undelegate() {
        let to: Operation = Delegation::new(manager(1), Some(pkh(KeyKind::Ed25519, 2))).into();
        let bytes = to.to_bytes(&Params::default()).unwrap();
        assert_eq!(bytes.len(), 31 + 1 + 21);
        assert_eq!(bytes[31], 0xff);
        assert_eq!(roundtrip(&to, &Params::default()), to);

        let none: Operation = Delegation::new(manager(1), None).into();
        let bytes = none.to_bytes(&Params::default()).unwrap();
        assert_eq!(bytes.last(), Some(&0x00));
        assert_eq!(roundtrip(&none, &Params::default()), none);
        assert!(none.to_json().unwrap().get("delegate").is_none());
    }

    #[test]
    fn test_invalid_flag_rejected() {
        let op: Operation = Delegation::new(manager(1), None).into();
        let mut bytes = op.to_bytes(&Params::default()).unwrap();
        *bytes.last_mut().unwrap() = 0x01;
        let err = Operation::decode(&mut Reader::new(&bytes), &Params::default()).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            CodecError::InvalidValue { field: "delegate", value: 1 }
        ));
    }
}
