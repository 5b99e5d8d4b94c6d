//! S-CSCF identity and the registration session cache.

use std::sync::Arc;
use std::time::Duration;
use volte_core::{Clock, EntityConfig, SessionCache};
use volte_sip::{via_branch, Message};

pub struct ScscfContext {
    pub domain: String,
    pub port: u16,
    /// Pending registrations (the cached first REGISTER), expected RES
    /// values, and the registered-user records.
    pub sessions: SessionCache<Message>,
}

impl ScscfContext {
    pub fn new(cfg: &EntityConfig) -> Self {
        Self {
            domain: cfg.domain.clone(),
            port: cfg.listen.port(),
            sessions: SessionCache::new(),
        }
    }

    /// Context with an injected clock, for tests stepping past the TTL.
    pub fn with_clock(cfg: &EntityConfig, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            domain: cfg.domain.clone(),
            port: cfg.listen.port(),
            sessions: SessionCache::with_clock(ttl, clock),
        }
    }

    pub fn via_line(&self) -> String {
        format!("SIP/2.0/UDP s-cscf.{}:{};branch={}", self.domain, self.port, via_branch())
    }
}
