//! Cryptographic primitives for the VoLTE signaling simulator.
//!
//! `milenage` implements the 3GPP Milenage algorithm set (TS 35.205/.206,
//! validated against the TS 35.208 test set); `aka` derives the AKA
//! authentication vector (RAND, AUTN, XRES, CK, IK) the HSS hands out in
//! AIA/MAA answers.

pub mod aka;
pub mod milenage;


pub use aka::{generate, generate_with_rand, AuthVector, VectorError};
pub use milenage::{milenage_f1, milenage_f2345, milenage_opc, MilenageError};
