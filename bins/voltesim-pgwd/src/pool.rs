//! Bounded IPv4 bearer-address pool.

use std::net::Ipv4Addr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("invalid pool CIDR {0:?}")]
    InvalidCidr(String),
}

/// Sequential allocator over the host range of one CIDR block. The network
/// and broadcast addresses are never handed out; nothing is ever returned
/// to the pool, matching the simulator's attach-only lifecycle.
#[derive(Debug)]
pub struct IpPool {
    next: u32,
    broadcast: u32,
}

impl IpPool {
    pub fn new(cidr: &str) -> Result<Self, PoolError> {
        let (addr_part, len_part) = cidr
            .split_once('/')
            .ok_or_else(|| PoolError::InvalidCidr(cidr.to_string()))?;
        let base: Ipv4Addr = addr_part
            .parse()
            .map_err(|_| PoolError::InvalidCidr(cidr.to_string()))?;
        let prefix: u32 = len_part
            .parse()
            .ok()
            .filter(|len| (1..=30).contains(len))
            .ok_or_else(|| PoolError::InvalidCidr(cidr.to_string()))?;

        let mask = !0u32 << (32 - prefix);
        let network = u32::from(base) & mask;
        Ok(Self { next: network + 1, broadcast: network | !mask })
    }

    /// Hand out the next host address, left to right through the block.
    pub fn allocate(&mut self) -> Option<Ipv4Addr> {
        if self.next >= self.broadcast {
            return None;
        }
        let ip = Ipv4Addr::from(self.next);
        self.next += 1;
        Some(ip)
    }

    /// Host addresses still available.
    pub fn remaining(&self) -> u32 {
        self.broadcast.saturating_sub(self.next)
    }
}
