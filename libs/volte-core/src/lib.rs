//! Signaling engine shared by every entity of the VoLTE simulator.
//!
//! Two signaling domains share one UDP socket per entity: the compact
//! binary circuit-domain protocol ("EPC") and text SIP. This crate holds
//! everything the entities have in common:
//!
//! - [`package`] / [`codec`]: the dual-format message envelope and its
//!   wire codec (first-byte sniff, heartbeat prefix, EPC frame, SIP text)
//! - [`kv`]: the CRLF `key=value` sub-format carried inside EPC payloads
//! - [`router`]: the (protocol, method) dispatch table with a per-dispatch
//!   panic boundary
//! - [`cache`]: the TTL-aware session cache correlating REGISTER legs with
//!   their authentication outcome, plus registered-user records and
//!   access-point address bindings
//! - [`config`] / [`transport`] / [`entity`]: YAML entity configuration,
//!   the UDP loops feeding the `in`/`up`/`down` channels, and the common
//!   processing loop the daemons run.

pub mod cache;
pub mod codec;
pub mod config;
pub mod entity;
pub mod error;
pub mod kv;
pub mod package;
pub mod router;
pub mod transport;


pub use cache::{Clock, ManualClock, SessionCache, SystemClock, UserRecord};
pub use config::{EntityConfig, Points, SubscriberConf};
pub use entity::run_loop;
pub use error::{CacheError, CodecError, ConfigError, EntityError, TransportError};
pub use package::{epc_method, Body, Package, Peer, Route, EPC_PROTOCOL, SIP_PROTOCOL};
pub use router::{Outbox, Router};
