//! MME: drives the EPS attach state machine.
//!
//! One attach walks four exchanges: AttachRequest from the access side,
//! AIR/AIA against the HSS, the AuthenticationRequest/Response challenge
//! toward the device, then ULR/ULA and the final AttachAccept plus the
//! CreateSessionRequest handed to the PGW. Per-IMSI state between steps
//! lives in the TTL session cache; a device answering after the TTL is
//! treated as a fresh unknown attach.

pub mod context;
pub mod handler;

pub use context::{AttachState, MmeContext};
pub use handler::routes;
