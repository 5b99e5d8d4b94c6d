//! eNodeB: the access proxy in front of the devices.
//!
//! Devices talk to the eNodeB only. EPC signaling is fanned to the MME,
//! SIP to the PGW, and anything arriving from the network side is relayed
//! back to the last device seen. Attach requests get the cell identifier
//! stamped in on the way up; a periodic heartbeat keeps the PGW's binding
//! for this cell fresh.

pub mod context;
pub mod handler;

pub use context::EnbContext;
pub use handler::routes;
