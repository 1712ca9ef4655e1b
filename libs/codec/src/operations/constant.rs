use super::{ManagerFields, OperationBody, manager_accessors};
use crate::error::Result;
use crate::kind::OpKind;
use crate::params::Params;
use crate::primitives::{Reader, Writer};
use crate::value::Value;
use serde::Serialize;

/// Register a value in the global constants table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterGlobalConstant {
    #[serde(flatten)]
    pub manager: ManagerFields,
    pub value: Value,
}

impl RegisterGlobalConstant {
    #[must_use]
    pub fn new(manager: ManagerFields, value: Value) -> Self {
        Self { manager, value }
    }
}

impl OperationBody for RegisterGlobalConstant {
    const KIND: OpKind = OpKind::RegisterGlobalConstant;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        self.manager.encode(w);
        self.value.encode_prefixed(w, "value")
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            manager: ManagerFields::decode(r)?,
            value: Value::decode_prefixed(r, "value")?,
        })
    }

    manager_accessors!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Operation;
    use crate::operations::fixtures::{manager, roundtrip};

    #[test]
    fn test_register_constant() {
        let op: Operation = RegisterGlobalConstant::new(manager(1), Value::unit()).into();
        let bytes = op.to_bytes(&Params::default()).unwrap();
        assert_eq!(bytes[0], 111);
        assert_eq!(&bytes[31..], &[0, 0, 0, 2, 0x03, 0x0b]);
        assert_eq!(roundtrip(&op, &Params::default()), op);
        assert_eq!(roundtrip(&op, &Params::legacy()), op);
        assert_eq!(op.to_json().unwrap()["value"]["prim"], "Unit");
    }
}
