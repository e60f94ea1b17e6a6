// mirath-rx/src/params.rs
//
// Parameter sets are marker types implementing MirathParams; the protocol
// is generic over them and the public entry points dispatch on the one-byte
// wire tag. Only derived sizes live in the defaults so a new set supplies
// just the raw figures.

pub trait MirathParams {
    const NAME: &'static str;
    const TAG: u8;

    // Field degree: GF(2^M_BITS). The arithmetic layer is fixed to GF(16).
    const M_BITS: usize = 4;

    const N_DIM: usize; // matrices are N_DIM x N_DIM
    const K_PARAM: usize; // size of the coefficient vector alpha
    const R_PARAM: usize; // rank bound on the witness E = S * C
    const N_PARTIES: usize; // simulated parties per execution (power of two)
    const TAU: usize; // parallel executions
    const SEED_BYTES: usize; // lambda / 8
    const SALT_BYTES: usize; // 2 * lambda / 8
    const DIGEST_BYTES: usize; // commitment / challenge hash width

    // --- Derived sizes ---

    // Syndrome length: n^2 - k coordinates of vec(E) pinned by the public key
    const SYNDROME_LEN: usize = Self::N_DIM * Self::N_DIM - Self::K_PARAM;
    const SYNDROME_BYTES: usize = (Self::SYNDROME_LEN + 1) / 2;

    const ALPHA_ELEMS: usize = Self::K_PARAM;
    const ALPHA_BYTES: usize = (Self::K_PARAM + 1) / 2;
    const S_ELEMS: usize = Self::N_DIM * Self::R_PARAM;
    const S_BYTES: usize = (Self::S_ELEMS + 1) / 2;
    const C_ELEMS: usize = Self::R_PARAM * Self::N_DIM;
    const C_BYTES: usize = (Self::C_ELEMS + 1) / 2;

    // One party's share (and the last party's aux correction): alpha, S, C
    const SHARE_BYTES: usize = Self::ALPHA_BYTES + Self::S_BYTES + Self::C_BYTES;
    const AUX_BYTES: usize = Self::SHARE_BYTES;

    // Outbound broadcast: u scalar, eta^T * S (r elems), C * gamma (r elems)
    const MSG_ELEMS: usize = 1 + 2 * Self::R_PARAM;
    const MSG_BYTES: usize = (Self::MSG_ELEMS + 1) / 2;

    // First-round challenge: gamma and eta, each N_DIM elements, per execution
    const CHAL1_BYTES_PER_EXEC: usize = (2 * Self::N_DIM + 1) / 2;

    const PK_BYTES: usize = 1 + Self::SEED_BYTES + Self::SYNDROME_BYTES;
    const SK_BYTES: usize = 1 + Self::SEED_BYTES;

    const OPENING_BYTES: usize = (Self::N_PARTIES - 1) * Self::SEED_BYTES
        + Self::DIGEST_BYTES
        + Self::AUX_BYTES
        + Self::MSG_BYTES;
    const SIG_BYTES: usize = 1
        + Self::SALT_BYTES
        + 2 * Self::DIGEST_BYTES
        + Self::TAU * Self::OPENING_BYTES;
}

// Mirath-I: the only shipped set, wire tag 0x01.
pub struct MirathI;

impl MirathParams for MirathI {
    const NAME: &'static str = "Mirath-I";
    const TAG: u8 = 0x01;
    const N_DIM: usize = 15;
    const K_PARAM: usize = 78;
    const R_PARAM: usize = 6;
    const N_PARTIES: usize = 32;
    const TAU: usize = 39;
    const SEED_BYTES: usize = 16;
    const SALT_BYTES: usize = 32;
    const DIGEST_BYTES: usize = 32;
}

pub fn is_known_tag(tag: u8) -> bool {
    tag == MirathI::TAG
}
