//! eNodeB state: the served cell and the device behind it.

use std::net::SocketAddr;
use volte_core::EntityConfig;

pub struct EnbContext {
    pub cell_id: String,
    /// Addresses of the network-side peers; a datagram from one of these
    /// is downlink traffic for the device.
    core_addrs: Vec<SocketAddr>,
    /// Transport address of the last device seen on the access side.
    pub ue_addr: Option<SocketAddr>,
}

impl EnbContext {
    pub fn new(cfg: &EntityConfig) -> Self {
        let core_addrs = ["MME", "PGW"]
            .iter()
            .filter_map(|name| cfg.points.resolve(name).ok())
            .collect();
        Self {
            cell_id: cfg.cell_id.clone().unwrap_or_default(),
            core_addrs,
            ue_addr: None,
        }
    }

    pub fn is_core(&self, addr: SocketAddr) -> bool {
        self.core_addrs.contains(&addr)
    }
}
