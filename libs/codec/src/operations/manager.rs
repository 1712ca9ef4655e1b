//! Fields shared by every fee-paying operation

use crate::error::Result;
use crate::limits::Limits;
use crate::primitives::{Reader, Writer};
use serde::Serialize;
use tzforge_crypto::PublicKeyHash;

/// Source, fee, counter and limits of a manager operation
///
/// A counter of zero means the counter has not been assigned yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ManagerFields {
    /// Account paying the fee
    pub source: PublicKeyHash,
    /// Fee in mutez
    #[serde(with = "crate::json::string")]
    pub fee: u64,
    /// Account counter, 0 when unassigned
    #[serde(with = "crate::json::string")]
    pub counter: u64,
    /// Gas limit
    #[serde(with = "crate::json::string")]
    pub gas_limit: u64,
    /// Storage limit in bytes
    #[serde(with = "crate::json::string")]
    pub storage_limit: u64,
}

impl ManagerFields {
    /// Fields for `source` with unassigned counter and zero limits
    #[must_use]
    pub fn new(source: PublicKeyHash) -> Self {
        Self {
            source,
            fee: 0,
            counter: 0,
            gas_limit: 0,
            storage_limit: 0,
        }
    }

    /// Set the counter
    #[must_use]
    pub fn with_counter(mut self, counter: u64) -> Self {
        self.counter = counter;
        self
    }

    /// Set fee, gas and storage limit at once
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.apply_limits(limits);
        self
    }

    /// Current limits
    #[must_use]
    pub fn limits(&self) -> Limits {
        Limits {
            fee: self.fee,
            gas_limit: self.gas_limit,
            storage_limit: self.storage_limit,
        }
    }

    pub(crate) fn apply_limits(&mut self, limits: Limits) {
        self.fee = limits.fee;
        self.gas_limit = limits.gas_limit;
        self.storage_limit = limits.storage_limit;
    }

    pub(crate) fn encode(&self, w: &mut Writer) {
        w.write_pkh(&self.source);
        w.write_n(self.fee);
        w.write_n(self.counter);
        w.write_n(self.gas_limit);
        w.write_n(self.storage_limit);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            source: r.read_pkh("source")?,
            fee: r.read_n("fee")?,
            counter: r.read_n("counter")?,
            gas_limit: r.read_n("gas_limit")?,
            storage_limit: r.read_n("storage_limit")?,
        })
    }
}
