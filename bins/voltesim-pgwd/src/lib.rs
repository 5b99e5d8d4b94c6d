//! PGW: bearer address allocation and the SIP pivot between access and core.
//!
//! Bearer IPs come from a bounded pool carved out of a configured CIDR.
//! Every allocation also binds the requesting access point's transport
//! address, which is what later lets the PGW decide, for each SIP message,
//! whether it came from the access leg (forward to the P-CSCF) or from the
//! core (relay back down to the bound access address). Heartbeats refresh
//! the binding.

pub mod context;
pub mod handler;
pub mod pool;

pub use context::PgwContext;
pub use handler::{on_heartbeat, routes};
pub use pool::IpPool;
