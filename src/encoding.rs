// mirath-rx/src/encoding.rs
//
// Byte layouts (little-endian, nibble packing low-first):
//   PK_bytes   = params_tag(1) || seed_pub || y (syndrome, nibble-packed)
//   SK_bytes   = params_tag(1) || seed_sec
//   blob_bytes = params_tag(1) || salt || h1 || h2 || tau openings, each
//                (N-1 seeds || hidden commitment || aux || hidden message)
// Decoders insist on exact lengths, matching tags and canonical padding
// nibbles; anything else is rejected.

use crate::f16::F16;
use crate::params::MirathParams;
use crate::vector::{decode_f16_slice, encode_f16_slice, padding_is_canonical};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureOpening {
    // Revealed leaf seeds in party order with the hidden party skipped
    pub revealed_seeds: Vec<Vec<u8>>,
    pub hidden_commitment: Vec<u8>,
    // Last party's share correction; all-zero when the last party is hidden
    pub aux: Vec<u8>,
    pub hidden_message: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureBlob {
    pub salt: Vec<u8>,
    pub h1: Vec<u8>,
    pub h2: Vec<u8>,
    pub openings: Vec<SignatureOpening>,
}

pub fn encode_public_key<P: MirathParams>(seed_pub: &[u8], y: &[F16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(P::PK_BYTES);
    out.push(P::TAG);
    out.extend_from_slice(seed_pub);
    out.extend_from_slice(&encode_f16_slice(y));
    out
}

pub fn decode_public_key<P: MirathParams>(bytes: &[u8]) -> Result<(Vec<u8>, Vec<F16>), String> {
    if bytes.len() != P::PK_BYTES {
        return Err(format!(
            "public key length: expected {}, got {}",
            P::PK_BYTES,
            bytes.len()
        ));
    }
    if bytes[0] != P::TAG {
        return Err(format!("public key tag mismatch: {:#04x}", bytes[0]));
    }
    let seed_pub = bytes[1..1 + P::SEED_BYTES].to_vec();
    let y_bytes = &bytes[1 + P::SEED_BYTES..];
    if !padding_is_canonical(P::SYNDROME_LEN, y_bytes) {
        return Err("public key padding nibble not canonical".to_string());
    }
    let y = decode_f16_slice(P::SYNDROME_LEN, y_bytes)?;
    Ok((seed_pub, y))
}

pub fn encode_secret_key<P: MirathParams>(seed_sec: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(P::SK_BYTES);
    out.push(P::TAG);
    out.extend_from_slice(seed_sec);
    out
}

pub fn decode_secret_key<P: MirathParams>(bytes: &[u8]) -> Result<Vec<u8>, String> {
    if bytes.len() != P::SK_BYTES {
        return Err(format!(
            "secret key length: expected {}, got {}",
            P::SK_BYTES,
            bytes.len()
        ));
    }
    if bytes[0] != P::TAG {
        return Err(format!("secret key tag mismatch: {:#04x}", bytes[0]));
    }
    Ok(bytes[1..].to_vec())
}

pub fn encode_signature<P: MirathParams>(blob: &SignatureBlob) -> Vec<u8> {
    let mut out = Vec::with_capacity(P::SIG_BYTES);
    out.push(P::TAG);
    out.extend_from_slice(&blob.salt);
    out.extend_from_slice(&blob.h1);
    out.extend_from_slice(&blob.h2);
    for opening in &blob.openings {
        for seed in &opening.revealed_seeds {
            out.extend_from_slice(seed);
        }
        out.extend_from_slice(&opening.hidden_commitment);
        out.extend_from_slice(&opening.aux);
        out.extend_from_slice(&opening.hidden_message);
    }
    out
}

pub fn decode_signature<P: MirathParams>(bytes: &[u8]) -> Result<SignatureBlob, String> {
    if bytes.len() != P::SIG_BYTES {
        return Err(format!(
            "signature length: expected {}, got {}",
            P::SIG_BYTES,
            bytes.len()
        ));
    }
    if bytes[0] != P::TAG {
        return Err(format!("signature tag mismatch: {:#04x}", bytes[0]));
    }
    let mut cursor = 1;
    let mut take = |len: usize| {
        let piece = bytes[cursor..cursor + len].to_vec();
        cursor += len;
        piece
    };
    let salt = take(P::SALT_BYTES);
    let h1 = take(P::DIGEST_BYTES);
    let h2 = take(P::DIGEST_BYTES);

    let mut openings = Vec::with_capacity(P::TAU);
    for _ in 0..P::TAU {
        let mut revealed_seeds = Vec::with_capacity(P::N_PARTIES - 1);
        for _ in 0..P::N_PARTIES - 1 {
            revealed_seeds.push(take(P::SEED_BYTES));
        }
        let hidden_commitment = take(P::DIGEST_BYTES);
        let aux = take(P::AUX_BYTES);
        let hidden_message = take(P::MSG_BYTES);
        if !padding_is_canonical(P::MSG_ELEMS, &hidden_message) {
            return Err("hidden message padding nibble not canonical".to_string());
        }
        openings.push(SignatureOpening {
            revealed_seeds,
            hidden_commitment,
            aux,
            hidden_message,
        });
    }
    Ok(SignatureBlob {
        salt,
        h1,
        h2,
        openings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::MirathI;

    fn sample_blob() -> SignatureBlob {
        let openings = (0..MirathI::TAU)
            .map(|j| SignatureOpening {
                revealed_seeds: (0..MirathI::N_PARTIES - 1)
                    .map(|i| vec![(j + i) as u8; MirathI::SEED_BYTES])
                    .collect(),
                hidden_commitment: vec![j as u8; MirathI::DIGEST_BYTES],
                aux: vec![0x33; MirathI::AUX_BYTES],
                // 13 elements: last byte keeps its high nibble clear
                hidden_message: vec![0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x01],
            })
            .collect();
        SignatureBlob {
            salt: vec![0xAA; MirathI::SALT_BYTES],
            h1: vec![0xBB; MirathI::DIGEST_BYTES],
            h2: vec![0xCC; MirathI::DIGEST_BYTES],
            openings,
        }
    }

    #[test]
    fn test_public_key_roundtrip() {
        let seed = vec![7u8; MirathI::SEED_BYTES];
        let y: Vec<F16> = (0..MirathI::SYNDROME_LEN)
            .map(|i| F16::new((i % 16) as u8))
            .collect();
        let encoded = encode_public_key::<MirathI>(&seed, &y);
        assert_eq!(encoded.len(), MirathI::PK_BYTES);
        assert_eq!(encoded[0], MirathI::TAG);
        let (seed2, y2) = decode_public_key::<MirathI>(&encoded).unwrap();
        assert_eq!(seed, seed2);
        assert_eq!(y, y2);
    }

    #[test]
    fn test_public_key_rejects_tag_and_length() {
        let seed = vec![7u8; MirathI::SEED_BYTES];
        let y = vec![F16::ZERO; MirathI::SYNDROME_LEN];
        let mut encoded = encode_public_key::<MirathI>(&seed, &y);
        encoded[0] = 0x7F;
        assert!(decode_public_key::<MirathI>(&encoded).is_err());
        encoded[0] = MirathI::TAG;
        encoded.push(0);
        assert!(decode_public_key::<MirathI>(&encoded).is_err());
    }

    #[test]
    fn test_public_key_rejects_noncanonical_padding() {
        let seed = vec![7u8; MirathI::SEED_BYTES];
        let y = vec![F16::ZERO; MirathI::SYNDROME_LEN];
        let mut encoded = encode_public_key::<MirathI>(&seed, &y);
        let last = encoded.len() - 1;
        encoded[last] |= 0xF0; // stray high nibble past the 147th element
        assert!(decode_public_key::<MirathI>(&encoded).is_err());
    }

    #[test]
    fn test_secret_key_roundtrip() {
        let seed = vec![9u8; MirathI::SEED_BYTES];
        let encoded = encode_secret_key::<MirathI>(&seed);
        assert_eq!(encoded.len(), MirathI::SK_BYTES);
        assert_eq!(decode_secret_key::<MirathI>(&encoded).unwrap(), seed);
        assert!(decode_secret_key::<MirathI>(&encoded[..encoded.len() - 1]).is_err());
    }

    #[test]
    fn test_signature_roundtrip() {
        let blob = sample_blob();
        let encoded = encode_signature::<MirathI>(&blob);
        assert_eq!(encoded.len(), MirathI::SIG_BYTES);
        let decoded = decode_signature::<MirathI>(&encoded).unwrap();
        assert_eq!(blob, decoded);
    }

    #[test]
    fn test_signature_rejects_bad_shapes() {
        let blob = sample_blob();
        let encoded = encode_signature::<MirathI>(&blob);
        assert!(decode_signature::<MirathI>(&encoded[..encoded.len() - 1]).is_err());
        let mut tagged = encoded.clone();
        tagged[0] = 0x02;
        assert!(decode_signature::<MirathI>(&tagged).is_err());
    }

    #[test]
    fn test_signature_rejects_noncanonical_message_padding() {
        let mut blob = sample_blob();
        blob.openings[0].hidden_message[MirathI::MSG_BYTES - 1] |= 0xF0;
        let encoded = encode_signature::<MirathI>(&blob);
        assert!(decode_signature::<MirathI>(&encoded).is_err());
    }
}
