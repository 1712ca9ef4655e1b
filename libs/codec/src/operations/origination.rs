use super::{ManagerFields, OperationBody, manager_accessors};
use crate::error::Result;
use crate::kind::OpKind;
use crate::params::Params;
use crate::primitives::{Reader, Writer};
use crate::value::Script;
use serde::Serialize;
use tzforge_crypto::PublicKeyHash;

/// Deploy a new smart contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Origination {
    #[serde(flatten)]
    pub manager: ManagerFields,
    #[serde(with = "crate::json::string")]
    pub balance: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegate: Option<PublicKeyHash>,
    pub script: Script,
}

impl Origination {
    #[must_use]
    pub fn new(manager: ManagerFields, script: Script) -> Self {
        Self {
            manager,
            balance: 0,
            delegate: None,
            script,
        }
    }

    /// Initial balance transferred from the source
    #[must_use]
    pub fn with_balance(mut self, balance: u64) -> Self {
        self.balance = balance;
        self
    }

    /// Delegate of the new contract
    #[must_use]
    pub fn with_delegate(mut self, delegate: PublicKeyHash) -> Self {
        self.delegate = Some(delegate);
        self
    }
}

impl OperationBody for Origination {
    const KIND: OpKind = OpKind::Origination;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        self.manager.encode(w);
        w.write_n(self.balance);
        w.write_option(self.delegate.as_ref(), Writer::write_pkh);
        self.script.encode(w)
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            manager: ManagerFields::decode(r)?,
            balance: r.read_n("balance")?,
            delegate: r.read_option("delegate", |r| r.read_pkh("delegate"))?,
            script: Script::decode(r)?,
        })
    }

    manager_accessors!();
}
