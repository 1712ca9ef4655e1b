use super::{ManagerFields, OperationBody, manager_accessors};
use crate::error::Result;
use crate::kind::OpKind;
use crate::params::Params;
use crate::primitives::{Reader, Writer};
use crate::value::Value;
use serde::Serialize;
use tzforge_crypto::Address;

/// Move tickets out of an implicit account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferTicket {
    #[serde(flatten)]
    pub manager: ManagerFields,
    #[serde(rename = "ticket_contents")]
    pub contents: Value,
    #[serde(rename = "ticket_ty")]
    pub ty: Value,
    #[serde(rename = "ticket_ticketer")]
    pub ticketer: Address,
    #[serde(rename = "ticket_amount", with = "crate::json::string")]
    pub amount: u64,
    pub destination: Address,
    pub entrypoint: String,
}

impl TransferTicket {
    #[must_use]
    pub fn new(
        manager: ManagerFields,
        contents: Value,
        ty: Value,
        ticketer: Address,
        amount: u64,
        destination: Address,
        entrypoint: impl Into<String>,
    ) -> Self {
        Self {
            manager,
            contents,
            ty,
            ticketer,
            amount,
            destination,
            entrypoint: entrypoint.into(),
        }
    }
}

impl OperationBody for TransferTicket {
    const KIND: OpKind = OpKind::TransferTicket;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        self.manager.encode(w);
        self.contents.encode_prefixed(w, "ticket_contents")?;
        self.ty.encode_prefixed(w, "ticket_ty")?;
        w.write_address(&self.ticketer);
        w.write_n(self.amount);
        w.write_address(&self.destination);
        w.write_bytes_prefixed(self.entrypoint.as_bytes(), "entrypoint")
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            manager: ManagerFields::decode(r)?,
            contents: Value::decode_prefixed(r, "ticket_contents")?,
            ty: Value::decode_prefixed(r, "ticket_ty")?,
            ticketer: r.read_address("ticket_ticketer")?,
            amount: r.read_n("ticket_amount")?,
            destination: r.read_address("destination")?,
            entrypoint: r.read_string_prefixed("entrypoint")?,
        })
    }

    manager_accessors!();
}
