//! PGW state: the bearer pool and the access-point address bindings.

use crate::pool::{IpPool, PoolError};
use volte_core::{EntityConfig, SessionCache};

pub struct PgwContext {
    pub pool: IpPool,
    /// Only the address-binding side of the cache is used here; the PGW
    /// keeps no pending sessions.
    pub bindings: SessionCache<()>,
}

impl PgwContext {
    pub fn new(cfg: &EntityConfig) -> Result<Self, PoolError> {
        let cidr = cfg
            .pool_cidr
            .as_deref()
            .ok_or_else(|| PoolError::InvalidCidr("pool_cidr missing from config".to_string()))?;
        Ok(Self {
            pool: IpPool::new(cidr)?,
            bindings: SessionCache::new(),
        })
    }
}
