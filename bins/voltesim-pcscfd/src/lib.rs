//! P-CSCF: the access-edge SIP proxy.
//!
//! Everything the devices send enters the IMS core here. The proxy stamps
//! a synthesized `Authorization` on a first REGISTER (devices do not send
//! one), passes the challenge-response REGISTER through untouched, answers
//! access-side INVITEs with an immediate 100 Trying, and otherwise shuttles
//! requests and responses between the PGW below and the I/S-CSCF above
//! based on the `Via` stack.

pub mod context;
pub mod handler;

pub use context::PcscfContext;
pub use handler::routes;
