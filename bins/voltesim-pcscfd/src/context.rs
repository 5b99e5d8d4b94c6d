//! P-CSCF identity used when stamping `Via` entries.

use volte_core::EntityConfig;
use volte_sip::via_branch;

pub struct PcscfContext {
    pub domain: String,
    pub port: u16,
}

impl PcscfContext {
    pub fn new(cfg: &EntityConfig) -> Self {
        Self { domain: cfg.domain.clone(), port: cfg.listen.port() }
    }

    /// This proxy's `Via` entry; the host part is what downstream hops
    /// match direction decisions on.
    pub fn via_line(&self) -> String {
        format!("SIP/2.0/UDP p-cscf.{}:{};branch={}", self.domain, self.port, via_branch())
    }
}
