// mirath-rx/src/minrank.rs
//
// The public instance is kept in syndrome form: seed_pub expands to H'
// ((n^2-k) x k) and the public key carries the syndrome y (n^2-k elements).
// The dual matrix family of the signing relation is derived on the fly:
//   M_l = unvec([H' e_l ; e_l])  for l = 1..k, and  M_0 = unvec([y ; 0]),
// with column-major unvec, so M_0 + sum alpha_l M_l = E exactly when
// vec(E) = [y + H' alpha ; alpha].

use crate::f16::{ct_eq, F16};
use crate::hashing::{aes128_ctr_prf, shake256, DOM_WITNESS};
use crate::matrix::Matrix;
use crate::params::MirathParams;
use crate::vector::{decode_f16_slice, Vector};
use zeroize::Zeroize;

#[derive(Debug, Clone)]
pub struct Instance {
    pub h_prime: Matrix, // (n^2 - k) x k
    pub y: Vec<F16>,     // n^2 - k
}

#[derive(Debug, Clone)]
pub struct Witness {
    pub alpha: Vec<F16>, // k coefficients of the dual family
    pub s: Matrix,       // n x r
    pub c: Matrix,       // r x n, left block is I_r
}

impl Zeroize for Witness {
    fn zeroize(&mut self) {
        self.alpha.zeroize();
        self.s.zeroize();
        self.c.zeroize();
    }
}

// Expands the public matrix H' from seed_pub with the public-seed PRF.
pub fn expand_h_prime<P: MirathParams>(seed_pub: &[u8]) -> Result<Matrix, String> {
    let elems = P::SYNDROME_LEN * P::K_PARAM;
    let stream = aes128_ctr_prf(seed_pub, (elems + 1) / 2);
    let elements = decode_f16_slice(elems, &stream)?;
    Matrix::new(P::SYNDROME_LEN, P::K_PARAM, elements)
}

// Derives the witness factors from the secret seed: S is n x r, C' is
// r x (n-r), and C = [I_r | C'] pins the rank of E = S * C to at most r.
pub fn derive_witness_factors<P: MirathParams>(seed_sec: &[u8]) -> Result<(Matrix, Matrix), String> {
    let s_elems = P::N_DIM * P::R_PARAM;
    let cp_elems = P::R_PARAM * (P::N_DIM - P::R_PARAM);
    let s_bytes = (s_elems + 1) / 2;
    let cp_bytes = (cp_elems + 1) / 2;

    let stream = shake256(DOM_WITNESS, &[seed_sec], s_bytes + cp_bytes);
    let s = Matrix::new(
        P::N_DIM,
        P::R_PARAM,
        decode_f16_slice(s_elems, &stream[..s_bytes])?,
    )?;
    let c_prime = Matrix::new(
        P::R_PARAM,
        P::N_DIM - P::R_PARAM,
        decode_f16_slice(cp_elems, &stream[s_bytes..])?,
    )?;
    let c = Matrix::identity(P::R_PARAM).hstack(&c_prime)?;
    Ok((s, c))
}

// Completes the witness: reads alpha off the trailing k coordinates of
// vec(E) and computes the syndrome y = vec(E)_A + H' * alpha.
pub fn complete_witness<P: MirathParams>(
    h_prime: &Matrix,
    s: &Matrix,
    c: &Matrix,
) -> Result<(Vec<F16>, Vec<F16>), String> {
    let mut e = s.mul_ct(c)?;
    let mut v = e.vec_cols();
    let alpha = v[P::SYNDROME_LEN..].to_vec();
    let mut h_alpha = h_prime.mul_vector(&Vector::new(alpha.clone()))?;
    let y = v[..P::SYNDROME_LEN]
        .iter()
        .zip(h_alpha.elements())
        .map(|(a, b)| *a + *b)
        .collect();
    e.zeroize();
    v.zeroize();
    h_alpha.zeroize();
    Ok((alpha, y))
}

// Confirms M_0 + sum alpha_l M_l == S * C in constant time. Keygen re-checks
// this before returning; a failure is an implementation bug.
pub fn relation_holds<P: MirathParams>(instance: &Instance, witness: &Witness) -> bool {
    let e = match witness.s.mul_ct(&witness.c) {
        Ok(e) => e,
        Err(_) => return false,
    };
    let h_alpha = match instance
        .h_prime
        .mul_vector(&Vector::new(witness.alpha.clone()))
    {
        Ok(v) => v,
        Err(_) => return false,
    };
    let mut expected: Vec<F16> = instance
        .y
        .iter()
        .zip(h_alpha.elements())
        .map(|(a, b)| *a + *b)
        .collect();
    expected.extend_from_slice(&witness.alpha);

    let mut actual = e.vec_cols();
    let equal = ct_eq(&actual, &expected);
    actual.zeroize();
    expected.zeroize();
    equal
}

// Public projections of the derived family under one execution's challenge
// pair: with w[col*n + row] = eta[row] * gamma[col] split at n^2-k into
// (w_A, w_B),
//   p_0  = <y, w_A>            = eta^T M_0 gamma
//   p[l] = <H'_col_l, w_A> + w_B[l] = eta^T M_l gamma.
pub fn challenge_projections<P: MirathParams>(
    instance: &Instance,
    gamma: &[F16],
    eta: &[F16],
) -> (F16, Vec<F16>) {
    let n = P::N_DIM;
    let syn = P::SYNDROME_LEN;
    let mut w = Vec::with_capacity(n * n);
    for col in 0..n {
        for row in 0..n {
            w.push(eta[row] * gamma[col]);
        }
    }
    let (w_a, w_b) = w.split_at(syn);

    let mut p0 = F16::ZERO;
    for i in 0..syn {
        p0 = p0 + instance.y[i] * w_a[i];
    }

    let mut p = Vec::with_capacity(P::K_PARAM);
    for l in 0..P::K_PARAM {
        let mut acc = w_b[l];
        for i in 0..syn {
            acc = acc + instance.h_prime.at(i, l) * w_a[i];
        }
        p.push(acc);
    }
    (p0, p)
}
