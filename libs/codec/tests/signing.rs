//! Signing flow: watermarks, digests, signatures and operation hashes

use tzforge_codec::operations::{Attestation, Endorsement, EndorsementWithSlot, Inlined, Preattestation};
use tzforge_codec::{CodecError, Limits, Op, Params, SignatureTail, Watermark, decode_op_with};
use tzforge_crypto::{
    BlockHash, BlockPayloadHash, ChainId, KeyKind, OperationHash, PrivateKey, Signature, Signer,
    blake2b_256,
};

const MAINNET: [u8; 4] = [0x7a, 0x06, 0xa7, 0x70];

fn key(kind: KeyKind) -> PrivateKey {
    PrivateKey::generate(kind, Some(&[42u8; 32])).unwrap()
}

fn branch() -> BlockHash {
    BlockHash::new([0x11; 32])
}

fn transfer(signer: &PrivateKey) -> Op {
    let mut op = Op::new()
        .with_source(signer.address())
        .with_transfer(signer.address().into(), 1_000)
        .unwrap()
        .with_branch(branch())
        .with_limits(
            &[Limits {
                fee: 0,
                gas_limit: 1_000,
                storage_limit: 0,
            }],
            100,
        )
        .unwrap();
    op.contents[0] = op.contents[0].clone().with_counter(7);
    op
}

#[test]
fn test_ed25519_signature_verifies() {
    let signer = key(KeyKind::Ed25519);
    let mut op = transfer(&signer);
    op.sign(&signer).unwrap();

    let signature = op.signature.clone().unwrap();
    let digest = op.digest().unwrap();
    assert!(signer.public_key().verify(&digest, &signature).unwrap());
    assert_eq!(digest, blake2b_256(&op.watermarked_bytes().unwrap()));
}

#[test]
fn test_bls_signed_group_roundtrip() {
    let signer = key(KeyKind::Bls12_381);
    let mut op = transfer(&signer);
    op.sign(&signer).unwrap();

    let bytes = op.bytes().unwrap();
    let signature = op.signature.as_ref().unwrap();
    assert_eq!(signature.as_bytes().len(), 96);
    assert_eq!(&bytes[bytes.len() - 96..], signature.as_bytes());

    let decoded = decode_op_with(&bytes, &Params::default(), SignatureTail::Required(96)).unwrap();
    assert_eq!(decoded.contents, op.contents);
    assert_eq!(decoded.signature.as_ref(), Some(signature));
    assert_eq!(decoded.hash().unwrap(), op.hash().unwrap());
}

#[test]
fn test_bls_signs_watermarked_bytes_unhashed() {
    let signer = key(KeyKind::Bls12_381);
    let mut op = transfer(&signer);
    op.sign(&signer).unwrap();

    let signature = op.signature.clone().unwrap();
    let public_key = signer.public_key();
    assert!(public_key.verify(&op.watermarked_bytes().unwrap(), &signature).unwrap());
    assert!(!public_key.verify(&op.digest().unwrap(), &signature).unwrap());
}

#[test]
fn test_digest_ignores_signature() {
    let signer = key(KeyKind::Ed25519);
    let op = transfer(&signer);
    let digest = op.digest().unwrap();
    let signed = op.clone().with_signature(Signature::from_bytes(&[1; 64]).unwrap());
    assert_eq!(signed.digest().unwrap(), digest);
    let resigned = op.with_signature(Signature::from_bytes(&[2; 64]).unwrap());
    assert_eq!(resigned.digest().unwrap(), digest);
}

#[test]
fn test_sign_is_idempotent() {
    let signer = key(KeyKind::Ed25519);
    let mut op = transfer(&signer).with_signature(Signature::from_bytes(&[9; 64]).unwrap());
    let before = op.clone();
    op.sign(&signer).unwrap();
    assert_eq!(op, before);
}

#[test]
fn test_sign_preconditions() {
    let signer = key(KeyKind::Ed25519);
    let mut no_branch = Op::new()
        .with_source(signer.address())
        .with_undelegation()
        .unwrap();
    assert!(matches!(no_branch.sign(&signer), Err(CodecError::MissingBranch)));
    assert!(no_branch.signature.is_none());

    let mut empty = Op::new().with_branch(branch());
    assert!(matches!(empty.sign(&signer), Err(CodecError::EmptyContents)));
}

#[test]
fn test_hash_covers_broadcast_bytes() {
    let signer = key(KeyKind::Ed25519);
    let mut op = transfer(&signer);
    let unsigned = op.hash().unwrap();
    op.sign(&signer).unwrap();
    let signed = op.hash().unwrap();
    assert_ne!(unsigned, signed);
    assert_eq!(signed, OperationHash::digest(&op.bytes().unwrap()));
    assert!(signed.to_b58check().starts_with('o'));
}

#[test]
fn test_attestation_watermark_binds_chain_id() {
    let op = Op::new()
        .with_branch(branch())
        .with_chain_id(ChainId::new(MAINNET))
        .with_contents(Attestation::new(1, 100, 0, BlockPayloadHash::new([3; 32])));
    let watermarked = op.watermarked_bytes().unwrap();
    assert_eq!(watermarked[0], Watermark::Attestation.as_byte());
    assert_eq!(&watermarked[1..5], &MAINNET);
    assert_eq!(&watermarked[5..37], branch().as_bytes());
    assert_eq!(&watermarked[5..], op.bytes().unwrap().as_slice());
}

#[test]
fn test_preattestation_watermark_from_params_chain_id() {
    let params = Params::default().with_chain_id(ChainId::new(MAINNET));
    let op = Op::new()
        .with_params(params)
        .with_branch(branch())
        .with_contents(Preattestation::new(1, 100, 0, BlockPayloadHash::new([3; 32])));
    let watermarked = op.watermarked_bytes().unwrap();
    assert_eq!(watermarked[0], 0x12);
    assert_eq!(&watermarked[1..5], &MAINNET);
}

#[test]
fn test_attestation_without_chain_id() {
    let op = Op::new()
        .with_branch(branch())
        .with_contents(Attestation::new(1, 100, 0, BlockPayloadHash::new([3; 32])));
    let watermarked = op.watermarked_bytes().unwrap();
    assert_eq!(watermarked[0], 0x13);
    assert_eq!(&watermarked[1..33], branch().as_bytes());
}

#[test]
fn test_generic_watermark_drops_chain_id() {
    let signer = key(KeyKind::Ed25519);
    let op = transfer(&signer).with_chain_id(ChainId::new(MAINNET));
    let watermarked = op.watermarked_bytes().unwrap();
    assert_eq!(watermarked[0], 0x03);
    assert_eq!(&watermarked[1..33], branch().as_bytes());
}

#[test]
fn test_endorsement_with_slot_carries_no_outer_signature() {
    let inner = Inlined::new(
        branch(),
        Endorsement::new(42),
        Signature::from_bytes(&[5; 64]).unwrap(),
    );
    let op = Op::new()
        .with_params(Params::legacy())
        .with_branch(branch())
        .with_contents(EndorsementWithSlot::new(inner, 7));
    let unsigned = op.bytes().unwrap();
    let op = op.with_signature(Signature::from_bytes(&[6; 64]).unwrap());

    assert_eq!(op.bytes().unwrap(), unsigned);
    let json = op.to_json().unwrap();
    assert!(json.get("signature").is_none());
    assert!(json["contents"][0]["endorsement"]["signature"].is_string());
    assert_eq!(op.watermarked_bytes().unwrap()[0], Watermark::LegacyEndorsement.as_byte());
}
