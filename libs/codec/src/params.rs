//! Protocol parameters that influence encoding and fee computation
//!
//! [`Params::default`] matches current mainnet. Values can be refreshed from
//! the node's `/chains/main/blocks/head/context/constants` response with
//! [`Params::from_constants_json`]; fields missing from the response keep
//! their defaults.

use crate::error::{CodecError, Result};
use crate::kind::LATEST_TAGS_VERSION;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tzforge_crypto::{ChainId, ProtocolHash};

/// Versioning knobs and fee constants for one network and protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Human readable network name
    pub network: String,
    /// Chain the parameters belong to, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
    /// Active protocol, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<ProtocolHash>,
    /// Which tag table to use (see [`crate::kind`])
    pub operation_tags_version: u8,
    /// Maximum age of a branch, in blocks
    pub max_operations_ttl: i64,
    /// Per-operation gas ceiling
    pub hard_gas_limit_per_operation: u64,
    /// Per-operation storage ceiling, in bytes
    pub hard_storage_limit_per_operation: u64,
    /// Storage burn per byte, in mutez
    pub cost_per_byte: u64,
    /// Storage charged for a new contract, in bytes
    pub origination_size: u64,
    /// Constant part of the baker minimum fee, in mutez
    pub minimal_fees_mutez: u64,
    /// Size part of the baker minimum fee, in nanotez per byte
    pub minimal_nanotez_per_byte: u64,
    /// Gas part of the baker minimum fee, in nanotez per gas unit
    pub minimal_nanotez_per_gas_unit: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            network: "mainnet".to_string(),
            chain_id: None,
            protocol: None,
            operation_tags_version: LATEST_TAGS_VERSION,
            max_operations_ttl: 240,
            hard_gas_limit_per_operation: 1_040_000,
            hard_storage_limit_per_operation: 60_000,
            cost_per_byte: 250,
            origination_size: 257,
            minimal_fees_mutez: 100,
            minimal_nanotez_per_byte: 1_000,
            minimal_nanotez_per_gas_unit: 100,
        }
    }
}

impl Params {
    /// Parameters for pre-Ithaca protocols (Babylon to Hangzhou)
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            operation_tags_version: 1,
            max_operations_ttl: 60,
            ..Self::default()
        }
    }

    /// Select the tags version
    #[must_use]
    pub fn with_tags_version(mut self, version: u8) -> Self {
        self.operation_tags_version = version;
        self
    }

    /// Set the chain id
    #[must_use]
    pub fn with_chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// True when Tenderbake consensus operations are in use
    #[must_use]
    pub fn is_tenderbake(&self) -> bool {
        self.operation_tags_version >= 2
    }

    /// Overlay the protocol constants returned by a node
    ///
    /// Numbers may be given either as JSON numbers or as decimal strings, as
    /// the node does for 64-bit values.
    pub fn from_constants_json(json: &str) -> Result<Self> {
        Self::default().merge_constants_json(json)
    }

    /// Overlay protocol constants onto these parameters
    pub fn merge_constants_json(mut self, json: &str) -> Result<Self> {
        let constants: Json = serde_json::from_str(json)?;

        if let Some(ttl) = read_constant(&constants, "max_operations_time_to_live")? {
            self.max_operations_ttl = i64::try_from(ttl).map_err(|_| CodecError::InvalidValue {
                field: "max_operations_time_to_live",
                value: ttl,
            })?;
        }
        if let Some(v) = read_constant(&constants, "hard_gas_limit_per_operation")? {
            self.hard_gas_limit_per_operation = v;
        }
        if let Some(v) = read_constant(&constants, "hard_storage_limit_per_operation")? {
            self.hard_storage_limit_per_operation = v;
        }
        if let Some(v) = read_constant(&constants, "cost_per_byte")? {
            self.cost_per_byte = v;
        }
        if let Some(v) = read_constant(&constants, "origination_size")? {
            self.origination_size = v;
        }
        if let Some(v) = read_constant(&constants, "minimal_fees")? {
            self.minimal_fees_mutez = v;
        }
        if let Some(v) = read_constant(&constants, "minimal_nanotez_per_byte")? {
            self.minimal_nanotez_per_byte = v;
        }
        if let Some(v) = read_constant(&constants, "minimal_nanotez_per_gas_unit")? {
            self.minimal_nanotez_per_gas_unit = v;
        }

        log::debug!(
            "loaded constants: ttl={} hard_gas={} hard_storage={} cost_per_byte={}",
            self.max_operations_ttl,
            self.hard_gas_limit_per_operation,
            self.hard_storage_limit_per_operation,
            self.cost_per_byte
        );
        Ok(self)
    }
}

fn read_constant(constants: &Json, key: &'static str) -> Result<Option<u64>> {
    match constants.get(key) {
        None | Some(Json::Null) => Ok(None),
        Some(Json::Number(n)) => n.as_u64().map(Some).ok_or_else(|| CodecError::Malformed {
            field: key,
            reason: format!("expected unsigned integer, got {n}"),
        }),
        Some(Json::String(s)) => s.parse().map(Some).map_err(|_| CodecError::Malformed {
            field: key,
            reason: format!("expected unsigned integer, got {s:?}"),
        }),
        Some(other) => Err(CodecError::Malformed {
            field: key,
            reason: format!("unexpected JSON value {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_current_era() {
        let params = Params::default();
        assert_eq!(params.operation_tags_version, 2);
        assert!(params.is_tenderbake());
        assert!(!Params::legacy().is_tenderbake());
    }

    #[test]
    fn test_constants_json_numbers_and_strings() {
        let json = r#"{
            "max_operations_time_to_live": 450,
            "hard_gas_limit_per_operation": "1040000",
            "hard_storage_limit_per_operation": "60000",
            "cost_per_byte": "250",
            "origination_size": 257,
            "unrelated": [1, 2, 3]
        }"#;
        let params = Params::from_constants_json(json).unwrap();
        assert_eq!(params.max_operations_ttl, 450);
        assert_eq!(params.hard_gas_limit_per_operation, 1_040_000);
        assert_eq!(params.cost_per_byte, 250);
        assert_eq!(params.minimal_fees_mutez, 100);
    }

    #[test]
    fn test_constants_json_rejects_garbage() {
        let err = Params::from_constants_json(r#"{"cost_per_byte": "lots"}"#).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { field: "cost_per_byte", .. }));

        let err = Params::from_constants_json("not json").unwrap_err();
        assert!(matches!(err, CodecError::Json(_)));
    }

    #[test]
    fn test_serde_roundtrip_with_defaults() {
        let params: Params = serde_json::from_str(r#"{"operation_tags_version": 1}"#).unwrap();
        assert_eq!(params.operation_tags_version, 1);
        assert_eq!(params.max_operations_ttl, 240);

        let json = serde_json::to_string(&params).unwrap();
        assert!(!json.contains("chain_id"));
        let back: Params = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
