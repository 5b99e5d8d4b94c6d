//! I-CSCF: the interrogating proxy.
//!
//! Sits between the access edge and the registrar. For each REGISTER it
//! asks the HSS synchronously (UAR/UAA, five-second deadline) which S-CSCF
//! serves the user before forwarding; no answer within the deadline turns
//! into a 504 back toward the device. Cross-domain requests from the peer
//! network enter the home domain here.

pub mod context;
pub mod handler;

pub use context::IcscfContext;
pub use handler::routes;
