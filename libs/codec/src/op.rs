//! The operation group container
//!
//! [`Op`] collects the contents of one operation group together with its
//! branch and signature, and owns the steps between building and
//! broadcasting:
//!
//! 1. build: `with_source`, then `with_transfer`, `with_call`, ...
//! 2. settle fees: [`Op::with_limits`] from a simulation or [`Op::with_min_fee`]
//! 3. sign: [`Op::sign`] over [`Op::watermarked_bytes`]
//! 4. broadcast: [`Op::bytes`], identified by [`Op::hash`]
//!
//! # Example
//!
//! ```rust
//! use tzforge_codec::{Limits, Op};
//! use tzforge_crypto::{BlockHash, KeyKind, PrivateKey, Signer};
//!
//! let key = PrivateKey::generate(KeyKind::Ed25519, Some(&[7u8; 32])).unwrap();
//! let mut op = Op::new()
//!     .with_source(key.address())
//!     .with_transfer(key.address().into(), 1_000_000)
//!     .unwrap()
//!     .with_branch(BlockHash::new([1u8; 32]))
//!     .with_limits(&[Limits { fee: 0, gas_limit: 169, storage_limit: 0 }], 100)
//!     .unwrap();
//! op.contents[0] = op.contents[0].clone().with_counter(42);
//! op.sign(&key).unwrap();
//! assert!(op.bytes().unwrap().len() > 32 + 64);
//! ```

use crate::error::{CodecError, Result};
use crate::fee;
use crate::kind::OpKind;
use crate::limits::Limits;
use crate::operations::{Delegation, ManagerFields, Operation, Origination, RegisterGlobalConstant, Transaction};
use crate::params::Params;
use crate::primitives::Writer;
use crate::value::{Entrypoint, Parameters, Script, Value};
use crate::watermark::Watermark;
use log::{debug, trace};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value as Json;
use tzforge_crypto::{
    Address, BlockHash, ChainId, OperationHash, PublicKeyHash, Signature, Signer, blake2b_256,
};

/// Amount used by [`Op::with_unstake_all`]; the protocol caps it at the
/// staked balance
pub const UNSTAKE_ALL: u64 = i64::MAX as u64;

/// An operation group: branch, ordered contents and an optional signature
///
/// `Op` is a plain value. Building is done through owned `with_*` methods;
/// callers that share one across threads lock or clone it themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Op {
    /// Block the group is anchored to
    pub branch: Option<BlockHash>,
    /// Operations in application order
    pub contents: Vec<Operation>,
    /// Signature over [`Op::watermarked_bytes`]
    pub signature: Option<Signature>,
    /// Chain bound into consensus watermarks; falls back to `params.chain_id`
    pub chain_id: Option<ChainId>,
    /// Requested time-to-live in blocks, for callers that pick the branch
    pub ttl: i64,
    /// Protocol parameters used to encode
    pub params: Params,
    /// Default source for the builder methods
    pub source: Option<PublicKeyHash>,
}

impl Default for Op {
    fn default() -> Self {
        Self::new()
    }
}

impl Op {
    /// Empty group with default parameters
    #[must_use]
    pub fn new() -> Self {
        let params = Params::default();
        Self {
            branch: None,
            contents: Vec::new(),
            signature: None,
            chain_id: None,
            ttl: params.max_operations_ttl - 2,
            params,
            source: None,
        }
    }

    /// True if any content still has an unassigned counter
    #[must_use]
    pub fn need_counter(&self) -> bool {
        self.contents.iter().any(|op| op.counter() == Some(0))
    }

    /// Sum of the limits of all contents
    #[must_use]
    pub fn limits(&self) -> Limits {
        self.contents.iter().map(Operation::limits).sum()
    }

    /// True once a signature is attached
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Encode for this protocol; the ttl is clamped to the new maximum
    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        let ttl = self.ttl;
        self.with_ttl(ttl)
    }

    /// Append an operation
    #[must_use]
    pub fn with_contents(mut self, op: impl Into<Operation>) -> Self {
        self.contents.push(op.into());
        self
    }

    /// Prepend an operation, e.g. a reveal
    #[must_use]
    pub fn with_contents_front(mut self, op: impl Into<Operation>) -> Self {
        self.contents.insert(0, op.into());
        self
    }

    /// Set the source of every manager operation added so far and make it
    /// the default for later builder calls
    ///
    /// Operations added after this call use `source`; operations added
    /// before it are rewritten. Builders that need a source fail with
    /// [`CodecError::MissingSource`] until this has been called.
    #[must_use]
    pub fn with_source(mut self, source: PublicKeyHash) -> Self {
        for op in &mut self.contents {
            op.set_source(source.clone());
        }
        self.source = Some(source);
        self
    }

    fn manager(&self) -> Result<ManagerFields> {
        self.source
            .clone()
            .map(ManagerFields::new)
            .ok_or(CodecError::MissingSource)
    }

    fn source_address(&self) -> Result<Address> {
        self.source
            .clone()
            .map(Address::Implicit)
            .ok_or(CodecError::MissingSource)
    }

    /// Plain tez transfer
    pub fn with_transfer(self, to: Address, amount: u64) -> Result<Self> {
        let op = Transaction::new(self.manager()?, to, amount);
        Ok(self.with_contents(op))
    }

    /// Contract call without transfer
    pub fn with_call(self, to: Address, params: Parameters) -> Result<Self> {
        self.with_call_ext(to, params, 0)
    }

    /// Contract call with a transfer of `amount`
    pub fn with_call_ext(self, to: Address, params: Parameters, amount: u64) -> Result<Self> {
        let op = Transaction::new(self.manager()?, to, amount).with_parameters(params);
        Ok(self.with_contents(op))
    }

    /// Originate a contract with no balance and no delegate
    pub fn with_origination(self, script: Script) -> Result<Self> {
        let op = Origination::new(self.manager()?, script);
        Ok(self.with_contents(op))
    }

    /// Originate a contract with an optional delegate and initial balance
    pub fn with_origination_ext(
        self,
        script: Script,
        baker: Option<PublicKeyHash>,
        amount: u64,
    ) -> Result<Self> {
        let mut op = Origination::new(self.manager()?, script).with_balance(amount);
        op.delegate = baker;
        Ok(self.with_contents(op))
    }

    /// Delegate the source to `to`
    pub fn with_delegation(self, to: PublicKeyHash) -> Result<Self> {
        let op = Delegation::new(self.manager()?, Some(to));
        Ok(self.with_contents(op))
    }

    /// Withdraw the source's delegation
    pub fn with_undelegation(self) -> Result<Self> {
        let op = Delegation::new(self.manager()?, None);
        Ok(self.with_contents(op))
    }

    /// Register the source as a baker by delegating to itself
    pub fn with_register_baker(self) -> Result<Self> {
        let manager = self.manager()?;
        let own = manager.source.clone();
        Ok(self.with_contents(Delegation::new(manager, Some(own))))
    }

    fn with_pseudo_call(self, entrypoint: Entrypoint, amount: u64) -> Result<Self> {
        let to = self.source_address()?;
        self.with_call_ext(to, Parameters::new(entrypoint, Value::unit()), amount)
    }

    /// Stake `amount` with the current delegate
    pub fn with_stake(self, amount: u64) -> Result<Self> {
        self.with_pseudo_call(Entrypoint::Stake, amount)
    }

    /// Request to unstake `amount`
    pub fn with_unstake(self, amount: u64) -> Result<Self> {
        self.with_pseudo_call(Entrypoint::Unstake, amount)
    }

    /// Request to unstake everything currently staked
    pub fn with_unstake_all(self) -> Result<Self> {
        self.with_pseudo_call(Entrypoint::Unstake, UNSTAKE_ALL)
    }

    /// Move unfrozen unstaked tez back to the spendable balance
    pub fn with_finalize_unstake(self) -> Result<Self> {
        self.with_pseudo_call(Entrypoint::FinalizeUnstake, 0)
    }

    /// Register a global constant
    pub fn with_register_constant(self, value: Value) -> Result<Self> {
        let op = RegisterGlobalConstant::new(self.manager()?, value);
        Ok(self.with_contents(op))
    }

    /// Requested time-to-live in blocks
    ///
    /// Values above `max_operations_ttl` fall back to two blocks below it;
    /// negative values become 1.
    #[must_use]
    pub fn with_ttl(mut self, ttl: i64) -> Self {
        self.ttl = if ttl > self.params.max_operations_ttl {
            self.params.max_operations_ttl - 2
        } else if ttl < 0 {
            1
        } else {
            ttl
        };
        self
    }

    /// Anchor the group to `branch`
    #[must_use]
    pub fn with_branch(mut self, branch: BlockHash) -> Self {
        self.branch = Some(branch);
        self
    }

    /// Chain id for consensus watermarks, used for remote signing
    #[must_use]
    pub fn with_chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Attach an externally produced signature; it is not verified
    #[must_use]
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Apply simulated limits and settle fees
    ///
    /// `limits[i]` belongs to `contents[i]`; contents without a simulated
    /// entry keep their limits. See [`fee::converge`] for how margin and fee
    /// are applied. The first operation also pays for the branch and
    /// signature bytes.
    pub fn with_limits(mut self, limits: &[Limits], margin: u64) -> Result<Self> {
        for (index, (op, simulated)) in self.contents.iter_mut().zip(limits).enumerate() {
            fee::converge(op, *simulated, margin, index, &self.params)?;
        }
        debug!("limits applied to {} operations: {:?}", self.contents.len(), self.limits());
        Ok(self)
    }

    /// Raise every fee to at least the minimum for its current gas limit
    pub fn with_min_fee(mut self) -> Result<Self> {
        for (index, op) in self.contents.iter_mut().enumerate() {
            fee::apply_min_fee(op, index, &self.params)?;
        }
        Ok(self)
    }

    fn first_kind(&self) -> Result<OpKind> {
        self.contents
            .first()
            .map(Operation::kind)
            .ok_or(CodecError::EmptyContents)
    }

    fn write_unsigned(&self, w: &mut Writer) -> Result<()> {
        let branch = self.branch.as_ref().ok_or(CodecError::MissingBranch)?;
        self.first_kind()?;
        w.write_bytes(branch.as_bytes());
        for op in &self.contents {
            op.encode(w, &self.params)?;
        }
        Ok(())
    }

    fn signature_is_serialized(&self) -> bool {
        self.contents
            .first()
            .is_some_and(|op| op.kind() != OpKind::EndorsementWithSlot)
    }

    /// Broadcast form: branch, contents and the raw signature
    ///
    /// The signature is appended without its curve tag, and never when the
    /// first content is an endorsement with slot (which carries its own).
    pub fn bytes(&self) -> Result<Vec<u8>> {
        let mut w = Writer::new();
        self.write_unsigned(&mut w)?;
        if let Some(signature) = self.signature.as_ref().filter(|_| self.signature_is_serialized()) {
            w.write_bytes(signature.as_bytes());
        }
        trace!("forged {}", hex::encode(w.as_bytes()));
        Ok(w.into_bytes())
    }

    /// Signing pre-image: watermark, optional chain id, branch and contents
    ///
    /// Never includes the signature and must never be broadcast.
    pub fn watermarked_bytes(&self) -> Result<Vec<u8>> {
        let watermark = Watermark::for_operation(self.first_kind()?, &self.params);
        let chain_id = self.chain_id.as_ref().or(self.params.chain_id.as_ref());
        let mut w = Writer::new();
        watermark.write(&mut w, chain_id);
        self.write_unsigned(&mut w)?;
        Ok(w.into_bytes())
    }

    /// Blake2b-256 of [`Op::watermarked_bytes`], the value Ed25519 keys sign
    pub fn digest(&self) -> Result<[u8; 32]> {
        Ok(blake2b_256(&self.watermarked_bytes()?))
    }

    /// Sign with `signer` and store the signature
    ///
    /// The signer gets [`Op::watermarked_bytes`]: Ed25519 keys sign
    /// [`Op::digest`], BLS keys the watermarked bytes themselves. Fails
    /// without a branch or contents. Does nothing when a signature is already
    /// attached.
    pub fn sign(&mut self, signer: &dyn Signer) -> Result<()> {
        let watermarked = self.watermarked_bytes()?;
        if self.signature.is_some() {
            debug!("operation already signed, not signing again");
            return Ok(());
        }
        let signature = signer.sign_operation(&watermarked)?;
        debug!("signed {} operations as {}", self.contents.len(), signer.address());
        self.signature = Some(signature);
        Ok(())
    }

    /// Operation hash of [`Op::bytes`]; only meaningful once signed
    pub fn hash(&self) -> Result<OperationHash> {
        Ok(OperationHash::digest(&self.bytes()?))
    }

    /// Node JSON form, see the [`Serialize`] impl
    pub fn to_json(&self) -> Result<Json> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Emits `branch`, `contents` and `signature`. The signature is left out
/// while unsigned, so the output can be sent to a remote forge, and for
/// endorsements with slot.
impl Serialize for Op {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let signature = self
            .signature
            .as_ref()
            .filter(|_| self.signature_is_serialized());
        let len = 1 + usize::from(self.branch.is_some()) + usize::from(signature.is_some());
        let mut s = serializer.serialize_struct("Op", len)?;
        if let Some(branch) = &self.branch {
            s.serialize_field("branch", branch)?;
        }
        s.serialize_field("contents", &self.contents)?;
        if let Some(signature) = signature {
            s.serialize_field("signature", signature)?;
        }
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::fixtures::{branch, contract, pkh, signature};
    use crate::operations::{Endorsement, EndorsementWithSlot, Inlined, Reveal};
    use tzforge_crypto::{KeyKind, PublicKey};

    fn source() -> PublicKeyHash {
        pkh(KeyKind::Ed25519, 1)
    }

    fn transfer_op() -> Op {
        Op::new()
            .with_source(source())
            .with_transfer(contract(2), 10)
            .unwrap()
            .with_branch(branch(3))
    }

    #[test]
    fn test_builders_require_source() {
        let op = Op::new();
        assert!(matches!(
            op.clone().with_transfer(contract(2), 1),
            Err(CodecError::MissingSource)
        ));
        assert!(matches!(op.clone().with_stake(1), Err(CodecError::MissingSource)));
        assert!(matches!(op.with_register_baker(), Err(CodecError::MissingSource)));
    }

    #[test]
    fn test_source_propagates_to_existing_contents() {
        let op = Op::new()
            .with_contents(Transaction::new(ManagerFields::new(pkh(KeyKind::P256, 9)), contract(2), 1))
            .with_source(source());
        assert_eq!(op.contents[0].source(), Some(&source()));
        let op = op.with_undelegation().unwrap();
        assert_eq!(op.contents[1].source(), Some(&source()));
    }

    #[test]
    fn test_need_counter() {
        let op = transfer_op();
        assert!(op.need_counter());
        let mut op = op;
        op.contents[0] = op.contents[0].clone().with_counter(5);
        assert!(!op.need_counter());
        // fee-less contents never need a counter
        let nonce = Op::new().with_contents(crate::operations::SeedNonceRevelation::new(1, [0; 32]));
        assert!(!nonce.need_counter());
    }

    #[test]
    fn test_pseudo_calls_target_source() {
        let op = Op::new()
            .with_source(source())
            .with_stake(5)
            .unwrap()
            .with_unstake_all()
            .unwrap()
            .with_finalize_unstake()
            .unwrap();
        let json = op.to_json().unwrap();
        let contents = json["contents"].as_array().unwrap();
        assert_eq!(contents[0]["parameters"]["entrypoint"], "stake");
        assert_eq!(contents[0]["amount"], "5");
        assert_eq!(contents[1]["amount"], "9223372036854775807");
        assert_eq!(contents[2]["parameters"]["entrypoint"], "finalize_unstake");
        assert_eq!(contents[2]["destination"], source().to_b58check());
    }

    #[test]
    fn test_register_baker_delegates_to_self() {
        let op = Op::new().with_source(source()).with_register_baker().unwrap();
        assert_eq!(op.to_json().unwrap()["contents"][0]["delegate"], source().to_b58check());
    }

    #[test]
    fn test_ttl_clamping() {
        let op = Op::new();
        assert_eq!(op.ttl, 238);
        assert_eq!(op.clone().with_ttl(500).ttl, 238);
        assert_eq!(op.clone().with_ttl(-5).ttl, 1);
        assert_eq!(op.clone().with_ttl(240).ttl, 240);
        assert_eq!(op.clone().with_ttl(12).ttl, 12);
        assert_eq!(op.with_params(Params::legacy()).ttl, 58);
    }

    #[test]
    fn test_bytes_preconditions() {
        assert!(matches!(Op::new().bytes(), Err(CodecError::MissingBranch)));
        assert!(matches!(
            Op::new().with_branch(branch(1)).bytes(),
            Err(CodecError::EmptyContents)
        ));
        let mut empty = Op::new().with_branch(branch(1));
        assert!(matches!(
            empty.sign(&tzforge_crypto::PrivateKey::generate(KeyKind::Ed25519, Some(&[1; 32])).unwrap()),
            Err(CodecError::EmptyContents)
        ));
    }

    #[test]
    fn test_signature_appended_raw() {
        let op = transfer_op();
        let unsigned = op.bytes().unwrap();
        let signed = op.with_signature(signature(0xee)).bytes().unwrap();
        assert_eq!(signed.len(), unsigned.len() + 64);
        assert_eq!(&signed[..unsigned.len()], unsigned.as_slice());
        assert!(signed[unsigned.len()..].iter().all(|b| *b == 0xee));
    }

    #[test]
    fn test_generic_watermark() {
        let op = transfer_op().with_chain_id(ChainId::new([1, 2, 3, 4]));
        let watermarked = op.watermarked_bytes().unwrap();
        assert_eq!(watermarked[0], 0x03);
        assert_eq!(&watermarked[1..], op.bytes().unwrap().as_slice());
    }

    #[test]
    fn test_endorsement_with_slot_never_serializes_signature() {
        let inner = Inlined::new(branch(1), Endorsement::new(5), signature(2));
        let op = Op::new()
            .with_params(Params::legacy())
            .with_branch(branch(1))
            .with_contents(EndorsementWithSlot::new(inner, 3));
        let unsigned = op.bytes().unwrap();
        let op = op.with_signature(signature(9));
        assert_eq!(op.bytes().unwrap(), unsigned);
        assert!(op.to_json().unwrap().get("signature").is_none());
        assert_eq!(op.watermarked_bytes().unwrap()[0], 0x02);
    }

    #[test]
    fn test_json_signature_only_when_signed() {
        let op = transfer_op();
        let json = op.to_json().unwrap();
        assert!(json.get("signature").is_none());
        assert_eq!(json["contents"][0]["kind"], "transaction");
        assert!(json["branch"].as_str().unwrap().starts_with('B'));

        let json = op.with_signature(signature(1)).to_json().unwrap();
        assert!(json["signature"].as_str().unwrap().starts_with("sig"));
    }

    #[test]
    fn test_limits_sum_over_contents() {
        let reveal = Reveal::new(
            ManagerFields::new(source()).with_limits(Limits {
                fee: 1,
                gas_limit: 2,
                storage_limit: 3,
            }),
            PublicKey::new(KeyKind::Ed25519, &[0; 32]).unwrap(),
        );
        let op = Op::new()
            .with_contents(reveal)
            .with_source(source())
            .with_transfer(contract(1), 1)
            .unwrap()
            .with_contents(crate::operations::SeedNonceRevelation::new(1, [0; 32]));
        let op = Op {
            contents: op
                .contents
                .into_iter()
                .map(|c| {
                    let limits = c.limits() + Limits::with_fee(10);
                    c.with_limits(limits)
                })
                .collect(),
            ..op
        };
        assert_eq!(
            op.limits(),
            Limits {
                fee: 21,
                gas_limit: 2,
                storage_limit: 3
            }
        );
    }

    #[test]
    fn test_with_limits_skips_missing_simulations() {
        let op = transfer_op()
            .with_transfer(contract(4), 1)
            .unwrap()
            .with_limits(
                &[Limits {
                    fee: 0,
                    gas_limit: 1_000,
                    storage_limit: 0,
                }],
                0,
            )
            .unwrap();
        assert_eq!(op.contents[0].limits().gas_limit, 1_000);
        assert_eq!(op.contents[1].limits(), Limits::default());
    }

    #[test]
    fn test_min_fee_covers_header_on_first_only() {
        let op = transfer_op()
            .with_transfer(contract(4), 1)
            .unwrap()
            .with_min_fee()
            .unwrap();
        let first = op.contents[0].limits().fee;
        let second = op.contents[1].limits().fee;
        assert_eq!(first, second + fee::BATCH_OVERHEAD as u64);
    }
}
