//! Integration tests for forging and decoding whole operation groups
//!
//! These go through the public API only: build an `Op`, serialize it, run the
//! bytes back through the dispatcher and compare.

use tzforge_codec::operations::{
    Attestation, Ballot, BallotVote, DalAttestation, DrainDelegate, FailingNoop,
    IncreasePaidStorage, Origination, Preattestation, Proposals, Reveal, SeedNonceRevelation,
    SetDepositsLimit, SmartRollupCement, SmartRollupRecoverBond, Transaction, TransferTicket,
    UpdateConsensusKey,
};
use tzforge_codec::{
    CodecError, Entrypoint, Limits, ManagerFields, Op, OpKind, Params, Parameters,
    Script, SignatureTail, Value, decode_op, decode_op_with,
};
use tzforge_crypto::{
    Address, BlockHash, BlockPayloadHash, ContractHash, KeyKind, ProtocolHash, PublicKey,
    PublicKeyHash, Signature, SmartRollupAddress,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pkh(fill: u8) -> PublicKeyHash {
    PublicKeyHash::new(KeyKind::Ed25519, [fill; 20])
}

fn kt1(fill: u8) -> Address {
    Address::Contract(ContractHash::new([fill; 20]))
}

fn manager(counter: u64) -> ManagerFields {
    ManagerFields::new(pkh(1)).with_counter(counter).with_limits(Limits {
        fee: 1_300,
        gas_limit: 1_100,
        storage_limit: 0,
    })
}

fn branch() -> BlockHash {
    BlockHash::new([0xab; 32])
}

fn nat(n: u8) -> Value {
    Value::from_binary(vec![0x00, n])
}

fn unsigned(bytes: &[u8]) -> Op {
    decode_op_with(bytes, &Params::default(), SignatureTail::Absent).unwrap()
}

#[test]
fn test_reveal_then_transaction_keeps_order() {
    init_logger();
    let public_key = PublicKey::new(KeyKind::Ed25519, &[0x42; 32]).unwrap();
    let op = Op::new()
        .with_branch(branch())
        .with_contents(Transaction::new(manager(2), kt1(3), 1_000_000))
        .with_contents_front(Reveal::new(manager(1), public_key));
    let bytes = op.bytes().unwrap();

    let decoded = decode_op(&bytes).unwrap();
    assert_eq!(decoded.contents.len(), 2);
    assert_eq!(decoded.contents[0].kind(), OpKind::Reveal);
    assert_eq!(decoded.contents[1].kind(), OpKind::Transaction);
    assert_eq!(decoded.bytes().unwrap(), bytes);
}

#[test]
fn test_mixed_manager_batch() {
    init_logger();
    let call = Parameters::new(Entrypoint::Named("mint".to_string()), nat(7));
    let op = Op::new()
        .with_branch(branch())
        .with_contents(Transaction::new(manager(10), kt1(2), 0).with_parameters(call))
        .with_contents(Origination::new(manager(11), Script::new(nat(1), nat(2))).with_balance(5))
        .with_contents(SetDepositsLimit::new(manager(12), None))
        .with_contents(SetDepositsLimit::new(manager(13), Some(1_000_000)))
        .with_contents(IncreasePaidStorage::new(manager(14), kt1(4), 100))
        .with_contents(UpdateConsensusKey::new(
            manager(15),
            PublicKey::new(KeyKind::Bls12_381, &[0x17; 48]).unwrap(),
        ))
        .with_contents(TransferTicket::new(
            manager(16),
            nat(3),
            Value::from_binary(vec![0x03, 0x62]),
            kt1(5),
            2,
            kt1(6),
            "receive",
        ))
        .with_contents(SmartRollupCement::new(manager(17), SmartRollupAddress::new([9; 20])))
        .with_contents(SmartRollupRecoverBond::new(
            manager(18),
            SmartRollupAddress::new([9; 20]),
            pkh(4),
        ));
    let bytes = op.bytes().unwrap();
    let decoded = unsigned(&bytes);
    assert_eq!(decoded.contents, op.contents);
    assert_eq!(decoded.bytes().unwrap(), bytes);
    assert!(!decoded.need_counter());
}

#[test]
fn test_fee_less_batch() {
    init_logger();
    let proto = ProtocolHash::new([0x5c; 32]);
    let op = Op::new()
        .with_branch(branch())
        .with_contents(Ballot::new(pkh(2), 100, proto, BallotVote::Pass))
        .with_contents(Proposals::new(pkh(2), 100, vec![proto; 20]))
        .with_contents(SeedNonceRevelation::new(5, [1; 32]))
        .with_contents(DrainDelegate::new(pkh(3), pkh(4), pkh(5)))
        .with_contents(DalAttestation::new(pkh(6), 0, 1))
        .with_contents(FailingNoop::new(Vec::new()));
    let bytes = op.bytes().unwrap();
    let decoded = unsigned(&bytes);
    assert_eq!(decoded.contents, op.contents);
    assert_eq!(decoded.limits(), Limits::default());
}

#[test]
fn test_consensus_batch() {
    init_logger();
    let payload = BlockPayloadHash::new([0x33; 32]);
    let op = Op::new()
        .with_branch(branch())
        .with_contents(Attestation::new(0, 1_000, 0, payload))
        .with_contents(Preattestation::new(u16::MAX, i32::MAX, 3, payload));
    let bytes = op.bytes().unwrap();
    assert_eq!(bytes[32], 21);
    let decoded = unsigned(&bytes);
    assert_eq!(decoded.contents, op.contents);
}

#[test]
fn test_short_buffers_are_rejected() {
    for len in 0..37 {
        let err = decode_op(&vec![0x6c; len]).unwrap_err();
        assert!(
            matches!(err, CodecError::ShortBuffer { len: l, .. } if l == len),
            "len {len}: {err}"
        );
    }
}

#[test]
fn test_error_identifies_variant_and_field() {
    let op = Op::new()
        .with_branch(branch())
        .with_contents(Ballot::new(pkh(2), 1, ProtocolHash::new([0; 32]), BallotVote::Yay));
    let mut bytes = op.bytes().unwrap();
    let last = bytes.len() - 1;
    bytes[last] = 7;
    let err = unsigned_err(&bytes);
    assert!(matches!(err, CodecError::Operation { kind: OpKind::Ballot, .. }));
    assert!(matches!(
        err.root_cause(),
        CodecError::InvalidValue {
            field: "ballot",
            value: 7
        }
    ));
}

fn unsigned_err(bytes: &[u8]) -> CodecError {
    decode_op_with(bytes, &Params::default(), SignatureTail::Absent).unwrap_err()
}

#[test]
fn test_legacy_kind_rejected_by_current_table() {
    let op = Op::new()
        .with_branch(branch())
        .with_contents(tzforge_codec::operations::Endorsement::new(1));
    let err = op.bytes().unwrap_err();
    assert!(matches!(
        err.root_cause(),
        CodecError::UnsupportedKind {
            kind: OpKind::Endorsement,
            version: 2
        }
    ));
}

#[test]
fn test_signed_batch_json() {
    let sig = Signature::from_bytes(&[0xfe; 64]).unwrap();
    let op = Op::new()
        .with_branch(branch())
        .with_contents(Transaction::new(manager(1), kt1(2), 12))
        .with_signature(sig);
    let bytes = op.bytes().unwrap();
    let decoded = decode_op(&bytes).unwrap();
    assert_eq!(decoded.to_json().unwrap(), op.to_json().unwrap());

    let json = decoded.to_json().unwrap();
    assert_eq!(json["contents"][0]["kind"], "transaction");
    assert_eq!(json["contents"][0]["amount"], "12");
    assert_eq!(json["contents"][0]["counter"], "1");
    assert_eq!(json["branch"], branch().to_b58check());
    assert_eq!(json["signature"], Signature::from_bytes(&[0xfe; 64]).unwrap().to_b58check());
}
