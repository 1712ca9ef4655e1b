//! Signing watermarks
//!
//! A watermark is the leading byte of a signing pre-image. It separates
//! blocks, consensus votes and ordinary operations so that a signature over
//! one category can never be replayed as another. Watermarked bytes are
//! signed, never broadcast.

use crate::error::{CodecError, Result};
use crate::kind::OpKind;
use crate::params::Params;
use crate::primitives::Writer;
use tzforge_crypto::ChainId;

/// Known watermark bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Watermark {
    /// Emmy block header (deprecated)
    LegacyBlock = 0x01,
    /// Emmy endorsement (deprecated)
    LegacyEndorsement = 0x02,
    /// Any non-consensus operation
    Generic = 0x03,
    /// Tenderbake block header
    Block = 0x11,
    /// Tenderbake preattestation
    Preattestation = 0x12,
    /// Tenderbake attestation
    Attestation = 0x13,
}

impl Watermark {
    /// Watermark for a batch whose first content has kind `first`
    ///
    /// The attestation family switches from the Emmy byte to the Tenderbake
    /// byte at tags version 2.
    #[must_use]
    pub fn for_operation(first: OpKind, params: &Params) -> Self {
        match first {
            OpKind::Endorsement | OpKind::EndorsementWithSlot | OpKind::Attestation => {
                if params.operation_tags_version < 2 {
                    Self::LegacyEndorsement
                } else {
                    Self::Attestation
                }
            }
            OpKind::Preattestation => Self::Preattestation,
            _ => Self::Generic,
        }
    }

    /// Convert byte to `Watermark` if known
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0x01 => Ok(Self::LegacyBlock),
            0x02 => Ok(Self::LegacyEndorsement),
            0x03 => Ok(Self::Generic),
            0x11 => Ok(Self::Block),
            0x12 => Ok(Self::Preattestation),
            0x13 => Ok(Self::Attestation),
            other => Err(CodecError::InvalidValue {
                field: "watermark",
                value: u64::from(other),
            }),
        }
    }

    /// Byte value
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// True for the Tenderbake watermarks that bind a chain id
    #[must_use]
    pub const fn binds_chain_id(self) -> bool {
        matches!(self, Self::Block | Self::Preattestation | Self::Attestation)
    }

    /// Write the watermark byte, followed by `chain_id` when this watermark
    /// binds one and it is known
    pub(crate) fn write(self, w: &mut Writer, chain_id: Option<&ChainId>) {
        w.write_byte(self.as_byte());
        if let Some(chain_id) = chain_id.filter(|_| self.binds_chain_id()) {
            w.write_bytes(chain_id.as_bytes());
        }
    }
}
