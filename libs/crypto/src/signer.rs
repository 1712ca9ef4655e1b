//! The signing capability consumed by operation containers
//!
//! Operation containers hand over the watermarked bytes. Ed25519 signs their
//! 32-byte blake2b digest while BLS signs the watermarked bytes as they are.
//! Remote custody backends implement the trait outside this crate.

use crate::address::{KeyKind, PublicKeyHash};
use crate::error::Result;
use crate::hash::blake2b_256;
use crate::key::{PrivateKey, Signature};

/// Something that can sign operations on behalf of an account
pub trait Signer {
    /// Sign a digest
    fn sign(&self, digest: &[u8]) -> Result<Signature>;

    /// Sign a watermarked operation
    ///
    /// The default signs the blake2b-256 digest. Signers holding BLS keys
    /// must sign `watermarked` unhashed.
    fn sign_operation(&self, watermarked: &[u8]) -> Result<Signature> {
        self.sign(&blake2b_256(watermarked))
    }

    /// Account whose key produces the signatures
    fn address(&self) -> PublicKeyHash;
}

impl Signer for PrivateKey {
    fn sign(&self, digest: &[u8]) -> Result<Signature> {
        log::trace!("signing {} byte digest with {:?} key", digest.len(), self.kind());
        Ok(self.sign_bytes(digest))
    }

    fn sign_operation(&self, watermarked: &[u8]) -> Result<Signature> {
        match self.kind() {
            KeyKind::Bls12_381 => {
                log::trace!("signing {} watermarked bytes with BLS key", watermarked.len());
                Ok(self.sign_bytes(watermarked))
            }
            _ => self.sign(&blake2b_256(watermarked)),
        }
    }

    fn address(&self) -> PublicKeyHash {
        self.public_key().hash()
    }
}

impl<T: Signer + ?Sized> Signer for &T {
    fn sign(&self, digest: &[u8]) -> Result<Signature> {
        (**self).sign(digest)
    }

    fn sign_operation(&self, watermarked: &[u8]) -> Result<Signature> {
        (**self).sign_operation(watermarked)
    }

    fn address(&self) -> PublicKeyHash {
        (**self).address()
    }
}
