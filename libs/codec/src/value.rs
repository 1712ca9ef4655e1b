//! Opaque contract values, call parameters and scripts
//!
//! The smart-contract value language is handled elsewhere. Anything that can
//! produce its own binary and JSON encoding implements [`MichelineEncode`]
//! and is captured into a [`Value`] when placed into an operation. Values
//! decoded from bytes keep their binary form and render as a hex string in
//! JSON.

use crate::error::{CodecError, Result};
use crate::primitives::{Reader, Writer};
use serde::Serialize;
use serde_json::{Value as Json, json};
use std::fmt;

/// Maximum length of a named entrypoint
pub const MAX_ENTRYPOINT_LEN: usize = 31;

/// Encoder contract for contract values supplied by the caller
pub trait MichelineEncode {
    /// Binary encoding, without length prefix
    fn to_binary(&self) -> Vec<u8>;

    /// JSON encoding as accepted by the node
    fn to_json(&self) -> Json;
}

/// An already-encoded contract value
///
/// Two values are equal when their binary encodings are equal.
#[derive(Clone)]
pub struct Value {
    binary: Vec<u8>,
    json: Json,
}

impl Value {
    /// Wrap a binary encoding together with its JSON form
    #[must_use]
    pub fn new(binary: Vec<u8>, json: Json) -> Self {
        Self { binary, json }
    }

    /// Capture any encodable value
    pub fn encode(value: &impl MichelineEncode) -> Self {
        Self::new(value.to_binary(), value.to_json())
    }

    /// Value known only by its binary form
    #[must_use]
    pub fn from_binary(binary: Vec<u8>) -> Self {
        let json = Json::String(hex::encode(&binary));
        Self { binary, json }
    }

    /// The `Unit` value
    #[must_use]
    pub fn unit() -> Self {
        Self::new(vec![0x03, 0x0b], json!({ "prim": "Unit" }))
    }

    /// Binary encoding
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.binary
    }

    /// JSON encoding
    #[must_use]
    pub fn json(&self) -> &Json {
        &self.json
    }

    pub(crate) fn encode_prefixed(&self, w: &mut Writer, field: &'static str) -> Result<()> {
        w.write_bytes_prefixed(&self.binary, field)
    }

    pub(crate) fn decode_prefixed(r: &mut Reader<'_>, field: &'static str) -> Result<Self> {
        Ok(Self::from_binary(r.read_bytes_prefixed(field)?))
    }
}

impl MichelineEncode for Value {
    fn to_binary(&self) -> Vec<u8> {
        self.binary.clone()
    }

    fn to_json(&self) -> Json {
        self.json.clone()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.binary == other.binary
    }
}

impl Eq for Value {}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value(0x{})", hex::encode(&self.binary))
    }
}

impl Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.json.serialize(serializer)
    }
}

/// Contract entrypoint selected by a call
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Entrypoint {
    /// `default`
    #[default]
    Default,
    /// `root`
    Root,
    /// `do`
    Do,
    /// `set_delegate`
    SetDelegate,
    /// `remove_delegate`
    RemoveDelegate,
    /// `deposit`
    Deposit,
    /// `stake` pseudo entrypoint
    Stake,
    /// `unstake` pseudo entrypoint
    Unstake,
    /// `finalize_unstake` pseudo entrypoint
    FinalizeUnstake,
    /// `set_delegate_parameters` pseudo entrypoint
    SetDelegateParameters,
    /// Any other entrypoint, by name
    Named(String),
}

impl Entrypoint {
    /// Entrypoint name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Default => "default",
            Self::Root => "root",
            Self::Do => "do",
            Self::SetDelegate => "set_delegate",
            Self::RemoveDelegate => "remove_delegate",
            Self::Deposit => "deposit",
            Self::Stake => "stake",
            Self::Unstake => "unstake",
            Self::FinalizeUnstake => "finalize_unstake",
            Self::SetDelegateParameters => "set_delegate_parameters",
            Self::Named(name) => name,
        }
    }

    /// Entrypoint from its name, using the compact form when one exists
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "default" => Self::Default,
            "root" => Self::Root,
            "do" => Self::Do,
            "set_delegate" => Self::SetDelegate,
            "remove_delegate" => Self::RemoveDelegate,
            "deposit" => Self::Deposit,
            "stake" => Self::Stake,
            "unstake" => Self::Unstake,
            "finalize_unstake" => Self::FinalizeUnstake,
            "set_delegate_parameters" => Self::SetDelegateParameters,
            other => Self::Named(other.to_string()),
        }
    }

    /// Compact form of a reserved name given as [`Entrypoint::Named`]
    fn canonical(&self) -> Option<Self> {
        match self {
            Self::Named(name) => {
                Some(Self::from_name(name)).filter(|e| !matches!(e, Self::Named(_)))
            }
            _ => None,
        }
    }

    fn encode(&self, w: &mut Writer) -> Result<()> {
        if let Some(compact) = self.canonical() {
            return compact.encode(w);
        }
        let tag = match self {
            Self::Default => 0,
            Self::Root => 1,
            Self::Do => 2,
            Self::SetDelegate => 3,
            Self::RemoveDelegate => 4,
            Self::Deposit => 5,
            Self::Stake => 6,
            Self::Unstake => 7,
            Self::FinalizeUnstake => 8,
            Self::SetDelegateParameters => 9,
            Self::Named(name) => {
                let len = u8::try_from(name.len())
                    .ok()
                    .filter(|len| usize::from(*len) <= MAX_ENTRYPOINT_LEN)
                    .ok_or(CodecError::LengthExceedsLimit {
                        field: "entrypoint",
                        len: name.len(),
                        max: MAX_ENTRYPOINT_LEN,
                    })?;
                w.write_byte(0xff);
                w.write_byte(len);
                w.write_bytes(name.as_bytes());
                return Ok(());
            }
        };
        w.write_byte(tag);
        Ok(())
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        match r.read_byte("entrypoint")? {
            0 => Ok(Self::Default),
            1 => Ok(Self::Root),
            2 => Ok(Self::Do),
            3 => Ok(Self::SetDelegate),
            4 => Ok(Self::RemoveDelegate),
            5 => Ok(Self::Deposit),
            6 => Ok(Self::Stake),
            7 => Ok(Self::Unstake),
            8 => Ok(Self::FinalizeUnstake),
            9 => Ok(Self::SetDelegateParameters),
            0xff => {
                let len = usize::from(r.read_byte("entrypoint")?);
                if len > MAX_ENTRYPOINT_LEN {
                    return Err(CodecError::LengthExceedsLimit {
                        field: "entrypoint",
                        len,
                        max: MAX_ENTRYPOINT_LEN,
                    });
                }
                let name = std::str::from_utf8(r.read_bytes(len, "entrypoint")?).map_err(|e| {
                    CodecError::Malformed {
                        field: "entrypoint",
                        reason: e.to_string(),
                    }
                })?;
                let entrypoint = Self::Named(name.to_string());
                if entrypoint.canonical().is_some() {
                    return Err(CodecError::Malformed {
                        field: "entrypoint",
                        reason: format!("{name} has a compact tag"),
                    });
                }
                Ok(entrypoint)
            }
            tag => Err(CodecError::InvalidValue {
                field: "entrypoint",
                value: u64::from(tag),
            }),
        }
    }
}

impl fmt::Display for Entrypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Entrypoint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Entrypoint and argument of a contract call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameters {
    /// Called entrypoint
    pub entrypoint: Entrypoint,
    /// Call argument
    pub value: Value,
}

impl Parameters {
    /// Call `entrypoint` with `value`
    #[must_use]
    pub fn new(entrypoint: Entrypoint, value: Value) -> Self {
        Self { entrypoint, value }
    }

    pub(crate) fn encode(&self, w: &mut Writer) -> Result<()> {
        self.entrypoint.encode(w)?;
        self.value.encode_prefixed(w, "parameters")
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let entrypoint = Entrypoint::decode(r)?;
        let value = Value::decode_prefixed(r, "parameters")?;
        Ok(Self { entrypoint, value })
    }
}

/// Code and initial storage of a contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Script {
    /// Contract code
    pub code: Value,
    /// Initial storage
    pub storage: Value,
}

impl Script {
    /// Pair code with storage
    #[must_use]
    pub fn new(code: Value, storage: Value) -> Self {
        Self { code, storage }
    }

    pub(crate) fn encode(&self, w: &mut Writer) -> Result<()> {
        self.code.encode_prefixed(w, "script.code")?;
        self.storage.encode_prefixed(w, "script.storage")
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let code = Value::decode_prefixed(r, "script.code")?;
        let storage = Value::decode_prefixed(r, "script.storage")?;
        Ok(Self { code, storage })
    }
}
