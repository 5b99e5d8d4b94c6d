//! AKA authentication-vector derivation.
//!
//! The HSS derives one vector per AIR/MAR answer from the subscriber's root
//! key and operator code (both stored as hex strings). The sequence number
//! is pinned to 1 and never incremented: real AKA advances SQN for replay
//! protection, but the simulated devices expect the fixed value, so the
//! deviation from TS 33.102 is kept on purpose.

use crate::milenage::{milenage_f1, milenage_f2345, AMF_LEN, SQN_LEN};
use rand::RngCore;
use thiserror::Error;

/// Fixed sequence number, big-endian over [`SQN_LEN`] bytes.
const FIXED_SQN: [u8; SQN_LEN] = [0, 0, 0, 0, 0, 0x01];
/// Authentication management field, zero in this simulation.
const AMF: [u8; AMF_LEN] = [0x00, 0x00];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VectorError {
    /// Root key or OPc was not valid hex, or had the wrong length.
    /// Derivation is aborted; no partial vector is returned.
    #[error("bad key material: {0}")]
    BadKeyMaterial(String),
}

/// One AKA authentication vector.
///
/// `AUTN = (SQN XOR AK) || AMF || MAC`; the device recomputes MAC from
/// RAND and proves possession of the root key by answering with RES = XRES.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthVector {
    pub rand: [u8; 16],
    pub autn: Vec<u8>,
    pub xres: Vec<u8>,
    pub ck: Vec<u8>,
    pub ik: Vec<u8>,
}

/// Derive a vector with a fresh 16-byte RAND.
pub fn generate(root_key_hex: &str, opc_hex: &str) -> Result<AuthVector, VectorError> {
    let mut rand = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut rand);
    generate_with_rand(root_key_hex, opc_hex, rand)
}

/// Derive a vector from caller-supplied RAND. Deterministic; used directly
/// by tests and by [`generate`].
pub fn generate_with_rand(
    root_key_hex: &str,
    opc_hex: &str,
    rand: [u8; 16],
) -> Result<AuthVector, VectorError> {
    let k = decode_key(root_key_hex)?;
    let opc = decode_key(opc_hex)?;

    let (mac, _mac_s) = milenage_f1(&opc, &k, &rand, &FIXED_SQN, &AMF)
        .map_err(|e| VectorError::BadKeyMaterial(e.to_string()))?;
    let (res, ck, ik, ak) = milenage_f2345(&opc, &k, &rand)
        .map_err(|e| VectorError::BadKeyMaterial(e.to_string()))?;

    let mut autn = xor_pad(&[0x01], &ak);
    autn.extend_from_slice(&AMF);
    autn.extend_from_slice(&mac);

    Ok(AuthVector {
        rand,
        autn,
        xres: res.to_vec(),
        ck: ck.to_vec(),
        ik: ik.to_vec(),
    })
}

fn decode_key(hex_str: &str) -> Result<[u8; 16], VectorError> {
    let bytes = hex::decode(hex_str.trim())
        .map_err(|e| VectorError::BadKeyMaterial(format!("{hex_str:?}: {e}")))?;
    bytes
        .try_into()
        .map_err(|_| VectorError::BadKeyMaterial(format!("{hex_str:?}: expected 16 bytes")))
}

/// XOR two byte strings; the shorter operand is left-padded with zeros so
/// both span the length of the longer one.
pub fn xor_pad(a: &[u8], b: &[u8]) -> Vec<u8> {
    let len = a.len().max(b.len());
    let mut out = vec![0u8; len];
    for (i, slot) in out.iter_mut().enumerate() {
        let av = if i + a.len() >= len { a[i + a.len() - len] } else { 0 };
        let bv = if i + b.len() >= len { b[i + b.len() - len] } else { 0 };
        *slot = av ^ bv;
    }
    out
}
