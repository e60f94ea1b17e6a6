// mirath-rx/src/hashing.rs
//
// All symmetric primitives: one SHAKE256 XOF with one-byte domain tags for
// every stream expansion, SHA3-256 for commitments and the two Fiat-Shamir
// hashes, and AES-128-CTR as the public-seed PRF for the instance matrix.

use crate::f16::F16;
use crate::params::MirathParams;
use crate::vector::decode_f16_slice;
use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};
use sha3::{Sha3_256, Shake256};

type Aes128Ctr = ctr::Ctr128BE<Aes128>;

// Domain tag registry. One byte, one use, never reused across contexts.
pub const DOM_WITNESS: u8 = 0x01; // seed_sec -> S, C'
pub const DOM_PUBLIC_SEED: u8 = 0x02; // seed_sec -> seed_pub
pub const DOM_MASTER: u8 = 0x03; // seed_sec, salt, message -> master seed
pub const DOM_TREE: u8 = 0x04; // seed tree nodes
pub const DOM_SHARE: u8 = 0x05; // leaf seed -> party share
pub const DOM_COMMIT: u8 = 0x06; // party commitments
pub const DOM_H1: u8 = 0x07; // first Fiat-Shamir hash
pub const DOM_H2: u8 = 0x08; // second Fiat-Shamir hash
pub const DOM_CHAL1: u8 = 0x09; // h1 -> per-execution (gamma, eta)
pub const DOM_CHAL2: u8 = 0x0A; // h2 -> per-execution hidden index

pub fn shake256(domain: u8, parts: &[&[u8]], output_len: usize) -> Vec<u8> {
    use sha3::digest::{ExtendableOutput, Update, XofReader};
    let mut shake = Shake256::default();
    shake.update(&[domain]);
    for part in parts {
        shake.update(part);
    }
    let mut output = vec![0u8; output_len];
    shake.finalize_xof().read(&mut output);
    output
}

pub fn sha3_256(domain: u8, parts: &[&[u8]]) -> Vec<u8> {
    use sha3::Digest;
    let mut hasher = Sha3_256::new();
    Digest::update(&mut hasher, [domain]);
    for part in parts {
        Digest::update(&mut hasher, part);
    }
    hasher.finalize().to_vec()
}

// Keystream of AES-128-CTR under the given seed with a zero IV. Used only
// to expand public instance material, where determinism is the sole
// requirement; the seed is never secret.
pub fn aes128_ctr_prf(seed: &[u8], output_len: usize) -> Vec<u8> {
    let mut key = [0u8; 16];
    let copy_len = seed.len().min(16);
    key[..copy_len].copy_from_slice(&seed[..copy_len]);
    let nonce = [0u8; 16];
    let mut cipher = Aes128Ctr::new(&key.into(), &nonce.into());
    let mut buffer = vec![0u8; output_len];
    cipher.apply_keystream(&mut buffer);
    buffer
}

// Binds one party's view inside one execution.
pub fn commit(salt: &[u8], exec: u16, party: u16, payload: &[u8]) -> Vec<u8> {
    sha3_256(
        DOM_COMMIT,
        &[salt, &exec.to_le_bytes(), &party.to_le_bytes(), payload],
    )
}

pub fn hash_h1(
    salt: &[u8],
    pk_bytes: &[u8],
    message: &[u8],
    commitments: &[Vec<u8>],
) -> Vec<u8> {
    use sha3::Digest;
    let mut hasher = Sha3_256::new();
    Digest::update(&mut hasher, [DOM_H1]);
    Digest::update(&mut hasher, salt);
    Digest::update(&mut hasher, pk_bytes);
    Digest::update(&mut hasher, message);
    for com in commitments {
        Digest::update(&mut hasher, com);
    }
    hasher.finalize().to_vec()
}

pub fn hash_h2(salt: &[u8], h1: &[u8], messages: &[Vec<u8>]) -> Vec<u8> {
    use sha3::Digest;
    let mut hasher = Sha3_256::new();
    Digest::update(&mut hasher, [DOM_H2]);
    Digest::update(&mut hasher, salt);
    Digest::update(&mut hasher, h1);
    for msg in messages {
        Digest::update(&mut hasher, msg);
    }
    hasher.finalize().to_vec()
}

// Expands the per-execution binary seed tree and returns its N_PARTIES leaf
// seeds. Heap layout: node i's children are 2i+1 and 2i+2; each expansion is
// salted and position-tagged so sibling subtrees never collide.
pub fn expand_seed_tree<P: MirathParams>(
    salt: &[u8],
    master_seed: &[u8],
    exec: u16,
) -> Vec<Vec<u8>> {
    let n = P::N_PARTIES;
    debug_assert!(n.is_power_of_two());
    let mut nodes: Vec<Vec<u8>> = Vec::with_capacity(2 * n - 1);
    nodes.push(shake256(
        DOM_TREE,
        &[salt, master_seed, &exec.to_le_bytes()],
        P::SEED_BYTES,
    ));
    for i in 0..n - 1 {
        let expanded = shake256(
            DOM_TREE,
            &[salt, &nodes[i], &(i as u16).to_le_bytes()],
            2 * P::SEED_BYTES,
        );
        let (left, right) = expanded.split_at(P::SEED_BYTES);
        nodes.push(left.to_vec());
        nodes.push(right.to_vec());
    }
    nodes.split_off(n - 1)
}

// Parses h1 into per-execution challenge pairs (gamma, eta). With a 4-bit
// field every nibble of XOF output is a field element, so no rejection step
// is needed here.
pub fn parse_first_challenge<P: MirathParams>(h1: &[u8]) -> Vec<(Vec<F16>, Vec<F16>)> {
    let per_exec = P::CHAL1_BYTES_PER_EXEC;
    let stream = shake256(DOM_CHAL1, &[h1], P::TAU * per_exec);
    let mut out = Vec::with_capacity(P::TAU);
    for chunk in stream.chunks_exact(per_exec) {
        let elems = decode_f16_slice(2 * P::N_DIM, chunk)
            .expect("challenge chunk width is fixed by parameters");
        let (gamma, eta) = elems.split_at(P::N_DIM);
        out.push((gamma.to_vec(), eta.to_vec()));
    }
    out
}

// Parses h2 into per-execution hidden-party indices. Bytes are rejection
// sampled against the largest multiple of N_PARTIES below 256 so the index
// is uniform; for N_PARTIES = 32 every byte is accepted.
pub fn parse_second_challenge<P: MirathParams>(h2: &[u8]) -> Vec<usize> {
    use sha3::digest::{ExtendableOutput, Update, XofReader};
    let mut shake = Shake256::default();
    shake.update(&[DOM_CHAL2]);
    shake.update(h2);
    let mut reader = shake.finalize_xof();

    let bound = 256 - (256 % P::N_PARTIES);
    let mut out = Vec::with_capacity(P::TAU);
    let mut byte = [0u8; 1];
    while out.len() < P::TAU {
        reader.read(&mut byte);
        if (byte[0] as usize) < bound {
            out.push(byte[0] as usize % P::N_PARTIES);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::MirathI;

    #[test]
    fn test_shake256_deterministic_and_domain_separated() {
        let a = shake256(DOM_TREE, &[b"seed"], 32);
        let b = shake256(DOM_TREE, &[b"seed"], 32);
        let c = shake256(DOM_SHARE, &[b"seed"], 32);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(shake256(DOM_TREE, &[b"seed"], 64)[..32], a[..]);
    }

    #[test]
    fn test_shake256_part_boundaries_matter_with_prefix() {
        // Parts are raw concatenation, so callers fix widths; different
        // domains must still separate identical concatenations.
        let a = shake256(DOM_H1, &[b"ab", b"c"], 16);
        let b = shake256(DOM_H1, &[b"a", b"bc"], 16);
        assert_eq!(a, b);
        let c = shake256(DOM_H2, &[b"abc"], 16);
        assert_ne!(a, c);
    }

    #[test]
    fn test_sha3_256_width() {
        let digest = sha3_256(DOM_COMMIT, &[b"payload"]);
        assert_eq!(digest.len(), 32);
    }

    #[test]
    fn test_aes128_ctr_prf_deterministic() {
        let seed = [7u8; 16];
        let a = aes128_ctr_prf(&seed, 100);
        let b = aes128_ctr_prf(&seed, 100);
        assert_eq!(a, b);
        assert_eq!(a.len(), 100);
        let c = aes128_ctr_prf(&[8u8; 16], 100);
        assert_ne!(a, c);
        // Prefix property: a longer stream extends a shorter one
        assert_eq!(aes128_ctr_prf(&seed, 40)[..], a[..40]);
    }

    #[test]
    fn test_commit_binds_position() {
        let salt = [0u8; 32];
        let a = commit(&salt, 0, 0, b"state");
        let b = commit(&salt, 0, 1, b"state");
        let c = commit(&salt, 1, 0, b"state");
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), MirathI::DIGEST_BYTES);
    }

    #[test]
    fn test_seed_tree_shape_and_determinism() {
        let salt = [1u8; 32];
        let master = [2u8; 16];
        let leaves = expand_seed_tree::<MirathI>(&salt, &master, 3);
        assert_eq!(leaves.len(), MirathI::N_PARTIES);
        assert!(leaves.iter().all(|l| l.len() == MirathI::SEED_BYTES));
        let again = expand_seed_tree::<MirathI>(&salt, &master, 3);
        assert_eq!(leaves, again);
        let other_exec = expand_seed_tree::<MirathI>(&salt, &master, 4);
        assert_ne!(leaves, other_exec);
    }

    #[test]
    fn test_first_challenge_shape() {
        let h1 = [9u8; 32];
        let challenges = parse_first_challenge::<MirathI>(&h1);
        assert_eq!(challenges.len(), MirathI::TAU);
        for (gamma, eta) in &challenges {
            assert_eq!(gamma.len(), MirathI::N_DIM);
            assert_eq!(eta.len(), MirathI::N_DIM);
        }
        assert_eq!(challenges, parse_first_challenge::<MirathI>(&h1));
    }

    #[test]
    fn test_second_challenge_in_range() {
        let h2 = [4u8; 32];
        let indices = parse_second_challenge::<MirathI>(&h2);
        assert_eq!(indices.len(), MirathI::TAU);
        assert!(indices.iter().all(|i| *i < MirathI::N_PARTIES));
        assert_eq!(indices, parse_second_challenge::<MirathI>(&h2));
    }
}
