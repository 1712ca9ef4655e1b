use super::{ManagerFields, OperationBody, manager_accessors};
use crate::error::Result;
use crate::kind::OpKind;
use crate::params::Params;
use crate::primitives::{Reader, Writer};
use serde::Serialize;
use tzforge_crypto::Address;

/// Prepay storage space for a contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncreasePaidStorage {
    #[serde(flatten)]
    pub manager: ManagerFields,
    #[serde(with = "crate::json::string")]
    pub amount: i64,
    pub destination: Address,
}

impl IncreasePaidStorage {
    #[must_use]
    pub fn new(manager: ManagerFields, destination: Address, amount: i64) -> Self {
        Self {
            manager,
            amount,
            destination,
        }
    }
}

impl OperationBody for IncreasePaidStorage {
    const KIND: OpKind = OpKind::IncreasePaidStorage;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        self.manager.encode(w);
        w.write_z(self.amount);
        w.write_address(&self.destination);
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            manager: ManagerFields::decode(r)?,
            amount: r.read_z("amount")?,
            destination: r.read_address("destination")?,
        })
    }

    manager_accessors!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Operation;
    use crate::operations::fixtures::{contract, manager, roundtrip};

    #[test]
    fn test_signed_amount() {
        for amount in [0, 1, -1, 64, -64, i64::MAX, i64::MIN + 1] {
            let op: Operation = IncreasePaidStorage::new(manager(1), contract(5), amount).into();
            assert_eq!(roundtrip(&op, &Params::default()), op);
        }
        let op: Operation = IncreasePaidStorage::new(manager(1), contract(5), -64).into();
        let bytes = op.to_bytes(&Params::default()).unwrap();
        assert_eq!(&bytes[31..33], &[0xc0, 0x01]);
        assert_eq!(op.to_json().unwrap()["amount"], "-64");
    }
}
