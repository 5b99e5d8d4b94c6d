//! I-CSCF identity and routing table.

use volte_core::{EntityConfig, Points};
use volte_sip::via_branch;

pub struct IcscfContext {
    pub domain: String,
    pub port: u16,
    /// Needed inside handlers for the synchronous HSS query.
    pub points: Points,
}

impl IcscfContext {
    pub fn new(cfg: &EntityConfig) -> Self {
        Self {
            domain: cfg.domain.clone(),
            port: cfg.listen.port(),
            points: cfg.points.clone(),
        }
    }

    pub fn via_line(&self) -> String {
        format!("SIP/2.0/UDP i-cscf.{}:{};branch={}", self.domain, self.port, via_branch())
    }
}
