//! Per-attach state carried between the exchanges of one EPS attach.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use volte_core::{Clock, EntityConfig, SessionCache};

/// State of one in-flight attach, keyed by IMSI.
#[derive(Debug, Clone)]
pub struct AttachState {
    /// Cell the device attached through, forwarded to the PGW so it can
    /// route SIP traffic back to the right access leg.
    pub cell_id: String,
    /// Transport address of the access node that relayed the attach.
    pub enb_addr: Option<SocketAddr>,
    /// Challenge fields sent to the device, kept for re-challenge after a
    /// failed authentication answer.
    pub challenge: HashMap<String, String>,
}

pub struct MmeContext {
    pub sessions: SessionCache<AttachState>,
}

impl MmeContext {
    pub fn new(_cfg: &EntityConfig) -> Self {
        Self { sessions: SessionCache::new() }
    }

    /// Cache with an injected clock, for tests stepping past the TTL.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { sessions: SessionCache::with_clock(ttl, clock) }
    }
}
