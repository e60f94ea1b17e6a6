// Deterministic fixtures: fixed secret seeds and salts pin every byte of
// the signature, so these scenarios double as reproducible vectors.

use mirath_rx::crypto::{keygen_from_seed, sign_with_salt, verify};
use mirath_rx::params::{MirathI, MirathParams};
use mirath_rx::prescription::CANONICAL_HEADER;

const ZERO_SEED: [u8; 16] = [0u8; 16];
const ZERO_SALT: [u8; 32] = [0u8; 32];

// "MIRATH-RX-v1\0" || field_id(0x01) || len(5, LE) || "HELLO"
fn hello_message() -> Vec<u8> {
    let mut message = CANONICAL_HEADER.to_vec();
    message.push(0x01);
    message.extend_from_slice(&5u32.to_le_bytes());
    message.extend_from_slice(b"HELLO");
    message
}

#[test]
fn scenario_1_zero_seed_zero_salt_verifies() {
    let (pk, sk) = keygen_from_seed(MirathI::TAG, &ZERO_SEED).unwrap();
    let message = hello_message();
    let blob = sign_with_salt(&sk, &message, &ZERO_SALT).unwrap();
    assert_eq!(blob.len(), MirathI::SIG_BYTES);
    assert!(verify(&pk, &message, &blob));

    // The vector is reproducible: identical inputs, identical bytes
    let replay = sign_with_salt(&sk, &message, &ZERO_SALT).unwrap();
    assert_eq!(blob, replay);
    println!(
        "[KAT] blob[..16] = {}, blob[-16..] = {}",
        hex::encode(&blob[..16]),
        hex::encode(&blob[blob.len() - 16..])
    );
}

#[test]
fn scenario_2_flipped_message_bit_rejects() {
    let (pk, sk) = keygen_from_seed(MirathI::TAG, &ZERO_SEED).unwrap();
    let message = hello_message();
    let blob = sign_with_salt(&sk, &message, &ZERO_SALT).unwrap();

    let mut flipped = message.clone();
    let last = flipped.len() - 1;
    flipped[last] ^= 0x01;
    assert!(!verify(&pk, &flipped, &blob));
}

#[test]
fn scenario_3_flipped_h1_bit_rejects() {
    let (pk, sk) = keygen_from_seed(MirathI::TAG, &ZERO_SEED).unwrap();
    let message = hello_message();
    let mut blob = sign_with_salt(&sk, &message, &ZERO_SALT).unwrap();

    // h1 sits after the tag and salt
    blob[1 + MirathI::SALT_BYTES] ^= 0x01;
    assert!(!verify(&pk, &message, &blob));
}

#[test]
fn scenario_4_header_only_message() {
    let mut seed = [0u8; 16];
    seed[0] = 0x01;
    let (pk, sk) = keygen_from_seed(MirathI::TAG, &seed).unwrap();
    let message = CANONICAL_HEADER.to_vec();
    let blob = sign_with_salt(&sk, &message, &ZERO_SALT).unwrap();
    assert_eq!(blob.len(), MirathI::SIG_BYTES);
    assert!(verify(&pk, &message, &blob));
}

#[test]
fn scenario_5_determinism_is_input_bound() {
    let (_, sk) = keygen_from_seed(MirathI::TAG, &ZERO_SEED).unwrap();
    let message = hello_message();

    let a = sign_with_salt(&sk, &message, &ZERO_SALT).unwrap();
    let b = sign_with_salt(&sk, &message, &ZERO_SALT).unwrap();
    assert_eq!(a, b);

    // Any input change moves the whole blob
    let mut other_salt = ZERO_SALT;
    other_salt[0] = 1;
    assert_ne!(a, sign_with_salt(&sk, &message, &other_salt).unwrap());

    let mut other_message = message.clone();
    other_message.push(0x00);
    assert_ne!(a, sign_with_salt(&sk, &other_message, &ZERO_SALT).unwrap());

    let (_, other_sk) = keygen_from_seed(MirathI::TAG, &[0x02u8; 16]).unwrap();
    assert_ne!(a, sign_with_salt(&other_sk, &message, &ZERO_SALT).unwrap());
}

#[test]
fn scenario_6_mauled_syndrome_rejects_valid_blob() {
    let (pk, sk) = keygen_from_seed(MirathI::TAG, &ZERO_SEED).unwrap();
    let message = hello_message();
    let blob = sign_with_salt(&sk, &message, &ZERO_SALT).unwrap();
    assert!(verify(&pk, &message, &blob));

    let mut mauled = pk.clone();
    mauled[1 + MirathI::SEED_BYTES] ^= 0x01; // byte 0 of y
    assert!(!verify(&mauled, &message, &blob));
}
