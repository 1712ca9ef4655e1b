use super::{ManagerFields, OperationBody, manager_accessors};
use crate::error::Result;
use crate::kind::OpKind;
use crate::params::Params;
use crate::primitives::{Reader, Writer};
use crate::value::Parameters;
use serde::Serialize;
use tzforge_crypto::Address;

/// Transfer of tez, optionally calling a contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    #[serde(flatten)]
    pub manager: ManagerFields,
    #[serde(with = "crate::json::string")]
    pub amount: u64,
    pub destination: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Parameters>,
}

impl Transaction {
    /// Plain transfer without parameters
    #[must_use]
    pub fn new(manager: ManagerFields, destination: Address, amount: u64) -> Self {
        Self {
            manager,
            amount,
            destination,
            parameters: None,
        }
    }

    /// Attach call parameters
    #[must_use]
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

impl OperationBody for Transaction {
    const KIND: OpKind = OpKind::Transaction;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        self.manager.encode(w);
        w.write_n(self.amount);
        w.write_address(&self.destination);
        match &self.parameters {
            Some(parameters) => {
                w.write_bool(true);
                parameters.encode(w)
            }
            None => {
                w.write_bool(false);
                Ok(())
            }
        }
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            manager: ManagerFields::decode(r)?,
            amount: r.read_n("amount")?,
            destination: r.read_address("destination")?,
            parameters: r.read_option("parameters", Parameters::decode)?,
        })
    }

    manager_accessors!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Operation;
    use crate::operations::fixtures::{contract, manager, roundtrip};
    use crate::value::{Entrypoint, Value};

    #[test]
    fn test_plain_transfer_layout() {
        let op: Operation = Transaction::new(manager(1), contract(2), 1_000_000).into();
        let bytes = op.to_bytes(&Params::default()).unwrap();
        assert_eq!(bytes[0], 108);
        // amount, destination, no parameters
        let tail = &bytes[bytes.len() - 26..];
        assert_eq!(&tail[..3], &[0xc0, 0x84, 0x3d]);
        assert_eq!(tail[3], 0x01);
        assert_eq!(tail[25], 0x00);
        assert_eq!(roundtrip(&op, &Params::default()), op);
    }

    #[test]
    fn test_call_roundtrip() {
        let op: Operation = Transaction::new(manager(1), contract(2), 0)
            .with_parameters(Parameters::new(
                Entrypoint::Named("transfer".to_string()),
                Value::from_binary(vec![0x05, 0x00, 0x01]),
            ))
            .into();
        assert_eq!(roundtrip(&op, &Params::default()), op);
        assert_eq!(roundtrip(&op, &Params::legacy()), op);
    }

    #[test]
    fn test_legacy_tag() {
        let op: Operation = Transaction::new(manager(1), contract(2), 1).into();
        let params = Params::default().with_tags_version(0);
        assert_eq!(op.to_bytes(&params).unwrap()[0], 8);
        assert_eq!(roundtrip(&op, &params), op);
    }

    #[test]
    fn test_json_omits_absent_parameters() {
        let op: Operation = Transaction::new(manager(1), contract(2), 1).into();
        let json = op.to_json().unwrap();
        assert!(json.get("parameters").is_none());
        assert!(json["destination"].as_str().unwrap().starts_with("KT1"));
    }
}
