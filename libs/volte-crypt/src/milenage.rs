//! 3GPP Milenage algorithm set (TS 35.205/.206).
//!
//! Milenage is defined over AES-128; all kernel functions are pure and
//! reentrant, so handlers may call them concurrently without locking.

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes128;
use thiserror::Error;

pub const RAND_LEN: usize = 16;
pub const AUTN_LEN: usize = 16;
pub const RES_LEN: usize = 8;
pub const CK_LEN: usize = 16;
pub const IK_LEN: usize = 16;
pub const AK_LEN: usize = 6;
pub const SQN_LEN: usize = 6;
pub const AMF_LEN: usize = 2;
pub const MAC_LEN: usize = 8;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilenageError {
    #[error("AES kernel failure")]
    Aes,
}

fn aes128_encrypt(key: &[u8; 16], block: &[u8; 16]) -> [u8; 16] {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut out = GenericArray::clone_from_slice(block);
    cipher.encrypt_block(&mut out);
    out.into()
}

/// Derive OPc from the operator variant configuration field OP and the
/// subscriber key K: `OPc = OP XOR E_K(OP)`.
pub fn milenage_opc(op: &[u8; 16], k: &[u8; 16]) -> [u8; 16] {
    let mut opc = aes128_encrypt(k, op);
    for i in 0..16 {
        opc[i] ^= op[i];
    }
    opc
}

/// Rotate `temp XOR opc` left by `r` bits into `out`.
fn rotate(r: u8, out: &mut [u8; 16], temp: &[u8; 16], opc: &[u8; 16]) {
    let shift = 16 - (r as usize / 8);
    let leftout = r as usize % 8;

    if leftout == 0 {
        for i in 0..16 {
            out[(i + shift) % 16] = temp[i] ^ opc[i];
        }
    } else {
        let mut rotated = [0u8; 16];
        for i in 0..16 {
            rotated[(i + shift) % 16] = temp[i] ^ opc[i];
        }
        let move_bits = 8 - leftout;
        out[15] = 0;
        for i in 0..15 {
            out[i] = (rotated[i] << move_bits) | (rotated[i + 1] >> leftout);
        }
        out[15] |= rotated[0] >> leftout;
    }
}

/// Milenage f1/f1*: network and resynchronization message authentication.
///
/// Returns `(MAC-A, MAC-S)`.
pub fn milenage_f1(
    opc: &[u8; 16],
    k: &[u8; 16],
    rand: &[u8; 16],
    sqn: &[u8; SQN_LEN],
    amf: &[u8; AMF_LEN],
) -> Result<([u8; MAC_LEN], [u8; MAC_LEN]), MilenageError> {
    const R1: u8 = 64;

    // TEMP = E_K(RAND XOR OPc)
    let mut tmp1 = [0u8; 16];
    for i in 0..16 {
        tmp1[i] = rand[i] ^ opc[i];
    }
    let temp = aes128_encrypt(k, &tmp1);

    // IN1 = SQN || AMF || SQN || AMF
    let mut in1 = [0u8; 16];
    in1[..6].copy_from_slice(sqn);
    in1[6..8].copy_from_slice(amf);
    in1[8..14].copy_from_slice(sqn);
    in1[14..16].copy_from_slice(amf);

    // OUT1 = E_K(TEMP XOR rot(IN1 XOR OPc, r1) XOR c1) XOR OPc, c1 = 0
    let mut tmp2 = [0u8; 16];
    rotate(R1, &mut tmp2, &in1, opc);
    for i in 0..16 {
        tmp2[i] ^= temp[i];
    }
    let mut out1 = aes128_encrypt(k, &tmp2);
    for i in 0..16 {
        out1[i] ^= opc[i];
    }

    let mut mac_a = [0u8; MAC_LEN];
    let mut mac_s = [0u8; MAC_LEN];
    mac_a.copy_from_slice(&out1[..8]);
    mac_s.copy_from_slice(&out1[8..]);
    Ok((mac_a, mac_s))
}

/// Milenage f2/f3/f4/f5: response and key derivation.
///
/// Returns `(RES, CK, IK, AK)`.
pub fn milenage_f2345(
    opc: &[u8; 16],
    k: &[u8; 16],
    rand: &[u8; 16],
) -> Result<([u8; RES_LEN], [u8; CK_LEN], [u8; IK_LEN], [u8; AK_LEN]), MilenageError> {
    const R2: u8 = 0;
    const R3: u8 = 32;
    const R4: u8 = 64;

    let mut tmp1 = [0u8; 16];
    for i in 0..16 {
        tmp1[i] = rand[i] ^ opc[i];
    }
    let temp = aes128_encrypt(k, &tmp1);

    // f2 and f5 share OUT2: rot by r2 is the identity, c2 = ..01
    rotate(R2, &mut tmp1, &temp, opc);
    tmp1[15] ^= 1;
    let mut out2 = aes128_encrypt(k, &tmp1);
    for i in 0..16 {
        out2[i] ^= opc[i];
    }
    let mut res = [0u8; RES_LEN];
    let mut ak = [0u8; AK_LEN];
    res.copy_from_slice(&out2[8..]);
    ak.copy_from_slice(&out2[..6]);

    // f3 (CK): rot by r3 = 32 bits, c3 = ..02
    rotate(R3, &mut tmp1, &temp, opc);
    tmp1[15] ^= 2;
    let mut ck = aes128_encrypt(k, &tmp1);
    for i in 0..16 {
        ck[i] ^= opc[i];
    }

    // f4 (IK): rot by r4 = 64 bits, c4 = ..04
    rotate(R4, &mut tmp1, &temp, opc);
    tmp1[15] ^= 4;
    let mut ik = aes128_encrypt(k, &tmp1);
    for i in 0..16 {
        ik[i] ^= opc[i];
    }

    Ok((res, ck, ik, ak))
}
