//! HSS: the subscriber authority.
//!
//! Holds the seeded subscriber store and answers the four EPC exchanges
//! addressed to it: AIR (attach authentication vectors for the MME), ULR
//! (location update, answered with the subscriber's APN), MAR (IMS
//! authentication vectors for the S-CSCF) and UAR (the I-CSCF's synchronous
//! S-CSCF assignment query, answered in place).

pub mod context;
pub mod handler;

pub use context::{HssContext, Subscriber, SubscriberStore};
pub use handler::routes;
