// mirath-rx/src/crypto.rs
//
// Key generation, signing and verification. The protocol is generic over
// the parameter set; the public entry points dispatch on the wire tag.
//
// Signing runs tau parallel executions of an N-party simulation:
//   seeds -> additive shares of (alpha, S, C) -> commitments -> h1
//   -> per-execution challenge (gamma, eta) -> broadcast messages -> h2
//   -> per-execution hidden party, all other views opened.
// Verification replays every opened party, takes the hidden party's
// commitment and message from the blob, recomputes both Fiat-Shamir hashes
// and enforces the projected MinRank relation on the reconstructed totals.

use crate::encoding::{
    decode_public_key, decode_secret_key, encode_public_key, encode_secret_key, encode_signature,
    decode_signature, SignatureBlob, SignatureOpening,
};
use crate::f16::F16;
use crate::hashing::{
    commit, expand_seed_tree, hash_h1, hash_h2, parse_first_challenge, parse_second_challenge,
    shake256, DOM_MASTER, DOM_PUBLIC_SEED, DOM_SHARE,
};
use crate::minrank::{
    challenge_projections, complete_witness, derive_witness_factors, expand_h_prime,
    relation_holds, Instance, Witness,
};
use crate::params::{MirathI, MirathParams};
use crate::vector::{decode_f16_slice, encode_f16_slice};
use rand::rngs::OsRng;
use rand::RngCore;
use std::error::Error;
use std::fmt;
use zeroize::Zeroize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    InvalidParams,
    InvalidKey,
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CryptoError::InvalidParams => write!(f, "unknown or unsupported parameter tag"),
            CryptoError::InvalidKey => write!(f, "key bytes failed structural checks"),
        }
    }
}

impl Error for CryptoError {}

// One simulated party's additive share of the witness, flattened row-major.
struct PartyShare {
    alpha: Vec<F16>,
    s: Vec<F16>, // n x r
    c: Vec<F16>, // r x n
}

impl Zeroize for PartyShare {
    fn zeroize(&mut self) {
        self.alpha.zeroize();
        self.s.zeroize();
        self.c.zeroize();
    }
}

fn expand_party_share<P: MirathParams>(salt: &[u8], leaf_seed: &[u8]) -> PartyShare {
    let stream = shake256(DOM_SHARE, &[salt, leaf_seed], P::SHARE_BYTES);
    let (alpha_bytes, rest) = stream.split_at(P::ALPHA_BYTES);
    let (s_bytes, c_bytes) = rest.split_at(P::S_BYTES);
    PartyShare {
        alpha: decode_f16_slice(P::ALPHA_ELEMS, alpha_bytes)
            .expect("share stream width is fixed by parameters"),
        s: decode_f16_slice(P::S_ELEMS, s_bytes)
            .expect("share stream width is fixed by parameters"),
        c: decode_f16_slice(P::C_ELEMS, c_bytes)
            .expect("share stream width is fixed by parameters"),
    }
}

// The party's broadcast under one execution's challenge: the scalar
// u = [leader] * p0 + <alpha_share, p>, the row vector eta^T * S_share and
// the column image C_share * gamma. Everything is linear in the share, which
// is what lets the verifier replay opened parties without interaction.
fn party_outbound<P: MirathParams>(
    share: &PartyShare,
    leader: bool,
    p0: F16,
    p: &[F16],
    gamma: &[F16],
    eta: &[F16],
) -> Vec<F16> {
    let n = P::N_DIM;
    let r = P::R_PARAM;

    let mut u = if leader { p0 } else { F16::ZERO };
    for l in 0..P::K_PARAM {
        u = u + share.alpha[l] * p[l];
    }

    let mut out = Vec::with_capacity(P::MSG_ELEMS);
    out.push(u);
    for col in 0..r {
        let mut acc = F16::ZERO;
        for row in 0..n {
            acc = acc + eta[row] * share.s[row * r + col];
        }
        out.push(acc);
    }
    for row in 0..r {
        let mut acc = F16::ZERO;
        for col in 0..n {
            acc = acc + share.c[row * n + col] * gamma[col];
        }
        out.push(acc);
    }
    out
}

fn accumulate_totals<P: MirathParams>(
    totals: &mut (F16, Vec<F16>, Vec<F16>),
    outbound: &[F16],
) {
    let r = P::R_PARAM;
    totals.0 = totals.0 + outbound[0];
    for i in 0..r {
        totals.1[i] = totals.1[i] + outbound[1 + i];
        totals.2[i] = totals.2[i] + outbound[1 + r + i];
    }
}

// The projected relation eta^T E gamma == <eta^T S, C gamma> on the
// reconstructed totals.
fn global_check<P: MirathParams>(totals: &(F16, Vec<F16>, Vec<F16>)) -> bool {
    let mut dot = F16::ZERO;
    for i in 0..P::R_PARAM {
        dot = dot + totals.1[i] * totals.2[i];
    }
    totals.0 == dot
}

fn derive_keypair<P: MirathParams>(seed_sec: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let seed_pub = shake256(DOM_PUBLIC_SEED, &[seed_sec], P::SEED_BYTES);
    let h_prime = expand_h_prime::<P>(&seed_pub).expect("instance width is fixed by parameters");
    let (s, c) = derive_witness_factors::<P>(seed_sec)
        .expect("witness width is fixed by parameters");
    let (alpha, y) = complete_witness::<P>(&h_prime, &s, &c)
        .expect("witness completion shapes are fixed by parameters");

    let instance = Instance { h_prime, y };
    let mut witness = Witness { alpha, s, c };
    debug_assert!(relation_holds::<P>(&instance, &witness));

    let pk_bytes = encode_public_key::<P>(&seed_pub, &instance.y);
    let sk_bytes = encode_secret_key::<P>(seed_sec);
    witness.zeroize();
    (pk_bytes, sk_bytes)
}

pub fn keygen_generic<P: MirathParams>(
    seed_input: Option<&[u8]>,
) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
    let mut seed_sec = match seed_input {
        Some(seed) => {
            if seed.len() != P::SEED_BYTES {
                return Err(CryptoError::InvalidKey);
            }
            seed.to_vec()
        }
        None => {
            let mut seed = vec![0u8; P::SEED_BYTES];
            OsRng.fill_bytes(&mut seed);
            seed
        }
    };
    let keypair = derive_keypair::<P>(&seed_sec);
    seed_sec.zeroize();
    Ok(keypair)
}

pub fn sign_generic<P: MirathParams>(
    sk_bytes: &[u8],
    message: &[u8],
    salt_input: Option<&[u8]>,
) -> Result<Vec<u8>, CryptoError> {
    let mut seed_sec =
        decode_secret_key::<P>(sk_bytes).map_err(|_| CryptoError::InvalidKey)?;

    let seed_pub = shake256(DOM_PUBLIC_SEED, &[seed_sec.as_slice()], P::SEED_BYTES);
    let h_prime = expand_h_prime::<P>(&seed_pub).expect("instance width is fixed by parameters");
    let (s, c) = derive_witness_factors::<P>(&seed_sec)
        .expect("witness width is fixed by parameters");
    let (alpha, y) = complete_witness::<P>(&h_prime, &s, &c)
        .expect("witness completion shapes are fixed by parameters");
    let instance = Instance { h_prime, y };
    let mut witness = Witness { alpha, s, c };
    let pk_bytes = encode_public_key::<P>(&seed_pub, &instance.y);

    let salt = match salt_input {
        Some(salt) => {
            if salt.len() != P::SALT_BYTES {
                witness.zeroize();
                seed_sec.zeroize();
                return Err(CryptoError::InvalidParams);
            }
            salt.to_vec()
        }
        None => {
            let mut salt = vec![0u8; P::SALT_BYTES];
            OsRng.fill_bytes(&mut salt);
            salt
        }
    };

    // Deterministic master seed: replays with the same salt reproduce the
    // same signature, and the derivation stays bound to the message.
    let mut master_seed = shake256(
        DOM_MASTER,
        &[seed_sec.as_slice(), salt.as_slice(), message],
        P::SEED_BYTES,
    );

    let s_flat = witness.s.elements().to_vec();
    let c_flat = witness.c.elements().to_vec();

    let n_parties = P::N_PARTIES;
    let mut exec_leaves: Vec<Vec<Vec<u8>>> = Vec::with_capacity(P::TAU);
    let mut exec_shares: Vec<Vec<PartyShare>> = Vec::with_capacity(P::TAU);
    let mut exec_aux: Vec<Vec<u8>> = Vec::with_capacity(P::TAU);
    let mut coms_flat: Vec<Vec<u8>> = Vec::with_capacity(P::TAU * n_parties);

    for exec in 0..P::TAU {
        let leaves = expand_seed_tree::<P>(&salt, &master_seed, exec as u16);
        let mut shares: Vec<PartyShare> = leaves
            .iter()
            .map(|leaf| expand_party_share::<P>(&salt, leaf))
            .collect();

        // Correction terms: witness minus the sum of all seed-derived shares
        let mut alpha_corr = witness.alpha.clone();
        let mut s_corr = s_flat.clone();
        let mut c_corr = c_flat.clone();
        for share in &shares {
            for (acc, v) in alpha_corr.iter_mut().zip(share.alpha.iter()) {
                *acc = *acc + *v;
            }
            for (acc, v) in s_corr.iter_mut().zip(share.s.iter()) {
                *acc = *acc + *v;
            }
            for (acc, v) in c_corr.iter_mut().zip(share.c.iter()) {
                *acc = *acc + *v;
            }
        }

        let mut aux = encode_f16_slice(&alpha_corr);
        aux.extend_from_slice(&encode_f16_slice(&s_corr));
        aux.extend_from_slice(&encode_f16_slice(&c_corr));

        // The last party carries the correction so the shares sum to the witness
        {
            let last = &mut shares[n_parties - 1];
            for (acc, v) in last.alpha.iter_mut().zip(alpha_corr.iter()) {
                *acc = *acc + *v;
            }
            for (acc, v) in last.s.iter_mut().zip(s_corr.iter()) {
                *acc = *acc + *v;
            }
            for (acc, v) in last.c.iter_mut().zip(c_corr.iter()) {
                *acc = *acc + *v;
            }
        }
        alpha_corr.zeroize();
        s_corr.zeroize();
        c_corr.zeroize();

        for (party, leaf) in leaves.iter().enumerate() {
            let com = if party == n_parties - 1 {
                let mut payload = leaf.clone();
                payload.extend_from_slice(&aux);
                commit(&salt, exec as u16, party as u16, &payload)
            } else {
                commit(&salt, exec as u16, party as u16, leaf)
            };
            coms_flat.push(com);
        }

        exec_leaves.push(leaves);
        exec_shares.push(shares);
        exec_aux.push(aux);
    }

    let h1 = hash_h1(&salt, &pk_bytes, message, &coms_flat);
    let challenges = parse_first_challenge::<P>(&h1);

    let mut msgs_flat: Vec<Vec<u8>> = Vec::with_capacity(P::TAU * n_parties);
    for exec in 0..P::TAU {
        let (gamma, eta) = &challenges[exec];
        let (p0, p) = challenge_projections::<P>(&instance, gamma, eta);
        for (party, share) in exec_shares[exec].iter().enumerate() {
            let mut outbound = party_outbound::<P>(share, party == 0, p0, &p, gamma, eta);
            msgs_flat.push(encode_f16_slice(&outbound));
            outbound.zeroize();
        }
    }

    let h2 = hash_h2(&salt, &h1, &msgs_flat);
    let hidden = parse_second_challenge::<P>(&h2);

    let mut openings = Vec::with_capacity(P::TAU);
    for exec in 0..P::TAU {
        let i_star = hidden[exec];
        let revealed_seeds: Vec<Vec<u8>> = exec_leaves[exec]
            .iter()
            .enumerate()
            .filter(|(party, _)| *party != i_star)
            .map(|(_, leaf)| leaf.clone())
            .collect();
        // When the hidden party is the aux carrier, the correction stays
        // inside its committed view and the wire slot is zero-filled.
        let aux = if i_star == n_parties - 1 {
            vec![0u8; P::AUX_BYTES]
        } else {
            exec_aux[exec].clone()
        };
        openings.push(SignatureOpening {
            revealed_seeds,
            hidden_commitment: coms_flat[exec * n_parties + i_star].clone(),
            aux,
            hidden_message: msgs_flat[exec * n_parties + i_star].clone(),
        });
    }

    let blob = SignatureBlob {
        salt,
        h1,
        h2,
        openings,
    };
    let signature = encode_signature::<P>(&blob);
    debug_assert_eq!(signature.len(), P::SIG_BYTES);

    // Secret material is scrubbed before the call returns
    for shares in exec_shares.iter_mut() {
        for share in shares.iter_mut() {
            share.zeroize();
        }
    }
    for leaves in exec_leaves.iter_mut() {
        for leaf in leaves.iter_mut() {
            leaf.zeroize();
        }
    }
    for aux in exec_aux.iter_mut() {
        aux.zeroize();
    }
    witness.zeroize();
    master_seed.zeroize();
    seed_sec.zeroize();
    let mut s_flat = s_flat;
    let mut c_flat = c_flat;
    s_flat.zeroize();
    c_flat.zeroize();

    Ok(signature)
}

pub fn verify_generic<P: MirathParams>(pk_bytes: &[u8], message: &[u8], blob_bytes: &[u8]) -> bool {
    let (seed_pub, y) = match decode_public_key::<P>(pk_bytes) {
        Ok(parts) => parts,
        Err(_) => return false,
    };
    let blob = match decode_signature::<P>(blob_bytes) {
        Ok(blob) => blob,
        Err(_) => return false,
    };
    let h_prime = match expand_h_prime::<P>(&seed_pub) {
        Ok(h) => h,
        Err(_) => return false,
    };
    let instance = Instance { h_prime, y };

    let challenges = parse_first_challenge::<P>(&blob.h1);
    let hidden = parse_second_challenge::<P>(&blob.h2);
    let n_parties = P::N_PARTIES;

    let mut coms_flat: Vec<Vec<u8>> = Vec::with_capacity(P::TAU * n_parties);
    let mut msgs_flat: Vec<Vec<u8>> = Vec::with_capacity(P::TAU * n_parties);

    for exec in 0..P::TAU {
        let opening = &blob.openings[exec];
        let i_star = hidden[exec];

        if i_star == n_parties - 1 && opening.aux.iter().any(|b| *b != 0) {
            return false;
        }

        let (gamma, eta) = &challenges[exec];
        let (p0, p) = challenge_projections::<P>(&instance, gamma, eta);
        let mut totals = (
            F16::ZERO,
            vec![F16::ZERO; P::R_PARAM],
            vec![F16::ZERO; P::R_PARAM],
        );

        for party in 0..n_parties {
            if party == i_star {
                let outbound = match decode_f16_slice(P::MSG_ELEMS, &opening.hidden_message) {
                    Ok(elems) => elems,
                    Err(_) => return false,
                };
                accumulate_totals::<P>(&mut totals, &outbound);
                coms_flat.push(opening.hidden_commitment.clone());
                msgs_flat.push(opening.hidden_message.clone());
                continue;
            }

            // Revealed seeds skip the hidden slot
            let seed_idx = if party < i_star { party } else { party - 1 };
            let leaf = &opening.revealed_seeds[seed_idx];
            let mut share = expand_party_share::<P>(&blob.salt, leaf);

            let com = if party == n_parties - 1 {
                // Aux is open here (the hidden party is someone else)
                let (a_bytes, rest) = opening.aux.split_at(P::ALPHA_BYTES);
                let (s_bytes, c_bytes) = rest.split_at(P::S_BYTES);
                let alpha_corr = match decode_f16_slice(P::ALPHA_ELEMS, a_bytes) {
                    Ok(v) => v,
                    Err(_) => return false,
                };
                let s_corr = match decode_f16_slice(P::S_ELEMS, s_bytes) {
                    Ok(v) => v,
                    Err(_) => return false,
                };
                let c_corr = match decode_f16_slice(P::C_ELEMS, c_bytes) {
                    Ok(v) => v,
                    Err(_) => return false,
                };
                for (acc, v) in share.alpha.iter_mut().zip(alpha_corr.iter()) {
                    *acc = *acc + *v;
                }
                for (acc, v) in share.s.iter_mut().zip(s_corr.iter()) {
                    *acc = *acc + *v;
                }
                for (acc, v) in share.c.iter_mut().zip(c_corr.iter()) {
                    *acc = *acc + *v;
                }
                let mut payload = leaf.clone();
                payload.extend_from_slice(&opening.aux);
                commit(&blob.salt, exec as u16, party as u16, &payload)
            } else {
                commit(&blob.salt, exec as u16, party as u16, leaf)
            };

            let outbound = party_outbound::<P>(&share, party == 0, p0, &p, gamma, eta);
            accumulate_totals::<P>(&mut totals, &outbound);
            coms_flat.push(com);
            msgs_flat.push(encode_f16_slice(&outbound));
        }

        if !global_check::<P>(&totals) {
            return false;
        }
    }

    let h1_check = hash_h1(&blob.salt, pk_bytes, message, &coms_flat);
    if h1_check != blob.h1 {
        return false;
    }
    let h2_check = hash_h2(&blob.salt, &blob.h1, &msgs_flat);
    h2_check == blob.h2
}

// --- Tag-dispatched entry points ---

pub fn keygen(params_tag: u8) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
    match params_tag {
        tag if tag == MirathI::TAG => keygen_generic::<MirathI>(None),
        _ => Err(CryptoError::InvalidParams),
    }
}

// Deterministic variant for fixtures and reproducible vectors.
pub fn keygen_from_seed(params_tag: u8, seed_sec: &[u8]) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
    match params_tag {
        tag if tag == MirathI::TAG => keygen_generic::<MirathI>(Some(seed_sec)),
        _ => Err(CryptoError::InvalidParams),
    }
}

pub fn sign(sk_bytes: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    match sk_bytes.first() {
        Some(&tag) if tag == MirathI::TAG => sign_generic::<MirathI>(sk_bytes, message, None),
        Some(_) => Err(CryptoError::InvalidParams),
        None => Err(CryptoError::InvalidKey),
    }
}

// Deterministic variant: a fixed salt reproduces the signature bit for bit.
pub fn sign_with_salt(sk_bytes: &[u8], message: &[u8], salt: &[u8]) -> Result<Vec<u8>, CryptoError> {
    match sk_bytes.first() {
        Some(&tag) if tag == MirathI::TAG => sign_generic::<MirathI>(sk_bytes, message, Some(salt)),
        Some(_) => Err(CryptoError::InvalidParams),
        None => Err(CryptoError::InvalidKey),
    }
}

// Never fails: malformed or mismatched inputs verify as false, with no
// indication of which internal check rejected.
pub fn verify(pk_bytes: &[u8], message: &[u8], blob_bytes: &[u8]) -> bool {
    match (pk_bytes.first(), blob_bytes.first()) {
        (Some(&pk_tag), Some(&sig_tag))
            if pk_tag == MirathI::TAG && sig_tag == MirathI::TAG =>
        {
            verify_generic::<MirathI>(pk_bytes, message, blob_bytes)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_keypair() -> (Vec<u8>, Vec<u8>) {
        keygen_from_seed(MirathI::TAG, &[0x5Au8; 16]).unwrap()
    }

    #[test]
    fn test_keygen_shapes() {
        let (pk, sk) = fixed_keypair();
        assert_eq!(pk.len(), MirathI::PK_BYTES);
        assert_eq!(sk.len(), MirathI::SK_BYTES);
        assert_eq!(pk[0], MirathI::TAG);
        assert_eq!(sk[0], MirathI::TAG);
    }

    #[test]
    fn test_keygen_deterministic_from_seed() {
        let a = keygen_from_seed(MirathI::TAG, &[7u8; 16]).unwrap();
        let b = keygen_from_seed(MirathI::TAG, &[7u8; 16]).unwrap();
        assert_eq!(a, b);
        let c = keygen_from_seed(MirathI::TAG, &[8u8; 16]).unwrap();
        assert_ne!(a.0, c.0);
    }

    #[test]
    fn test_keygen_rejects_unknown_tag_and_bad_seed() {
        assert_eq!(keygen(0x7F).unwrap_err(), CryptoError::InvalidParams);
        assert_eq!(
            keygen_from_seed(MirathI::TAG, &[0u8; 15]).unwrap_err(),
            CryptoError::InvalidKey
        );
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let (pk, sk) = fixed_keypair();
        let message = b"one round trip";
        let signature = sign_with_salt(&sk, message, &[0x11u8; 32]).unwrap();
        assert_eq!(signature.len(), MirathI::SIG_BYTES);
        assert!(verify(&pk, message, &signature));
    }

    #[test]
    fn test_sign_deterministic_with_fixed_salt() {
        let (_, sk) = fixed_keypair();
        let message = b"determinism";
        let salt = [0x21u8; 32];
        let a = sign_with_salt(&sk, message, &salt).unwrap();
        let b = sign_with_salt(&sk, message, &salt).unwrap();
        assert_eq!(a, b);
        let c = sign_with_salt(&sk, message, &[0x22u8; 32]).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_sign_rejects_bad_inputs() {
        let (_, sk) = fixed_keypair();
        assert_eq!(sign(&[], b"m").unwrap_err(), CryptoError::InvalidKey);
        assert_eq!(sign(&[0x7F, 0, 0], b"m").unwrap_err(), CryptoError::InvalidParams);
        assert_eq!(
            sign(&sk[..sk.len() - 1], b"m").unwrap_err(),
            CryptoError::InvalidKey
        );
        assert_eq!(
            sign_with_salt(&sk, b"m", &[0u8; 31]).unwrap_err(),
            CryptoError::InvalidParams
        );
    }

    #[test]
    fn test_verify_rejects_wrong_message() {
        let (pk, sk) = fixed_keypair();
        let signature = sign_with_salt(&sk, b"original", &[1u8; 32]).unwrap();
        assert!(!verify(&pk, b"altered", &signature));
    }

    #[test]
    fn test_verify_rejects_truncation_and_tags() {
        let (pk, sk) = fixed_keypair();
        let message = b"shapes";
        let signature = sign_with_salt(&sk, message, &[2u8; 32]).unwrap();
        assert!(!verify(&pk, message, &signature[..signature.len() - 1]));
        assert!(!verify(&pk, message, &[]));
        let mut wrong_tag = signature.clone();
        wrong_tag[0] = 0x02;
        assert!(!verify(&pk, message, &wrong_tag));
        let mut wrong_pk = pk.clone();
        wrong_pk[0] = 0x02;
        assert!(!verify(&wrong_pk, message, &signature));
    }
}
