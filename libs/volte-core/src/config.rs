//! YAML entity configuration.
//!
//! One schema serves every daemon; sections a given entity does not use
//! (subscriber seed list, IP pool CIDR, cell id) simply stay absent from
//! its file.

use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;

/// Routing table: logical peer name ("HSS", "PCSCF", "SCSCF", "OTHER",
/// ...) to transport address. Populated at start-up, read-only afterwards.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Points(HashMap<String, SocketAddr>);

impl Points {
    pub fn new(map: HashMap<String, SocketAddr>) -> Self {
        Self(map)
    }

    pub fn resolve(&self, name: &str) -> Result<SocketAddr, ConfigError> {
        self.0
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownPeer(name.to_string()))
    }

    pub fn insert(&mut self, name: impl Into<String>, addr: SocketAddr) {
        self.0.insert(name.into(), addr);
    }
}

/// Subscriber seed record for the HSS in-memory store.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriberConf {
    pub imsi: String,
    pub username: String,
    /// Root key K, hex.
    pub root_key: String,
    /// Operator code OPc, hex.
    pub opc: String,
    pub apn: String,
}

/// Per-daemon configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityConfig {
    /// UDP listen address of this entity.
    pub listen: SocketAddr,
    /// Home network domain, e.g. `hebei.mobile.3gpp.net`.
    pub domain: String,
    /// Logical peer routing table.
    #[serde(default)]
    pub points: Points,
    /// PGW only: CIDR the bearer address pool is carved from.
    #[serde(default)]
    pub pool_cidr: Option<String>,
    /// eNodeB only: cell identifier sent in heartbeats and attach requests.
    #[serde(default)]
    pub cell_id: Option<String>,
    /// eNodeB only: heartbeat period in seconds.
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,
    /// HSS only: subscriber seed list.
    #[serde(default)]
    pub subscribers: Vec<SubscriberConf>,
}

fn default_heartbeat_secs() -> u64 {
    10
}

impl EntityConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_str(&text)
    }

    pub fn from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }
}
