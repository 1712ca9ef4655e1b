use super::{ManagerFields, OperationBody, manager_accessors};
use crate::error::Result;
use crate::kind::OpKind;
use crate::params::Params;
use crate::primitives::{Reader, Writer};
use serde::Serialize;

/// Cap the frozen deposits of a delegate; `None` removes the cap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetDepositsLimit {
    #[serde(flatten)]
    pub manager: ManagerFields,
    #[serde(
        serialize_with = "crate::json::opt_string::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub limit: Option<u64>,
}

impl SetDepositsLimit {
    #[must_use]
    pub fn new(manager: ManagerFields, limit: Option<u64>) -> Self {
        Self { manager, limit }
    }
}

impl OperationBody for SetDepositsLimit {
    const KIND: OpKind = OpKind::SetDepositsLimit;

    fn encode_body(&self, w: &mut Writer, _params: &Params) -> Result<()> {
        self.manager.encode(w);
        w.write_option(self.limit.as_ref(), |w, limit| w.write_n(*limit));
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _params: &Params) -> Result<Self> {
        Ok(Self {
            manager: ManagerFields::decode(r)?,
            limit: r.read_option("limit", |r| r.read_n("limit"))?,
        })
    }

    manager_accessors!();
}
