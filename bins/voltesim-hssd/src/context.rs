//! HSS state: the in-memory subscriber store.

use std::collections::HashMap;
use volte_core::{EntityConfig, Points, SubscriberConf};

/// One provisioned subscriber. Key material stays hex-encoded at rest and
/// is only decoded at vector-derivation time.
#[derive(Debug, Clone)]
pub struct Subscriber {
    pub imsi: String,
    pub username: String,
    pub root_key: String,
    pub opc: String,
    pub apn: String,
}

/// Subscriber store, indexed both ways: the EPS attach flow looks
/// subscribers up by IMSI, the IMS registration flow by SIP username.
pub struct SubscriberStore {
    by_imsi: HashMap<String, Subscriber>,
    by_username: HashMap<String, Subscriber>,
}

impl SubscriberStore {
    pub fn from_conf(seeds: &[SubscriberConf]) -> Self {
        let mut by_imsi = HashMap::new();
        let mut by_username = HashMap::new();
        for seed in seeds {
            let sub = Subscriber {
                imsi: seed.imsi.clone(),
                username: seed.username.clone(),
                root_key: seed.root_key.clone(),
                opc: seed.opc.clone(),
                apn: seed.apn.clone(),
            };
            by_imsi.insert(sub.imsi.clone(), sub.clone());
            by_username.insert(sub.username.clone(), sub);
        }
        Self { by_imsi, by_username }
    }

    pub fn by_imsi(&self, imsi: &str) -> Option<&Subscriber> {
        self.by_imsi.get(imsi)
    }

    pub fn by_username(&self, username: &str) -> Option<&Subscriber> {
        self.by_username.get(username)
    }

    pub fn len(&self) -> usize {
        self.by_imsi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_imsi.is_empty()
    }
}

pub struct HssContext {
    pub store: SubscriberStore,
    pub points: Points,
}

impl HssContext {
    pub fn new(cfg: &EntityConfig) -> Self {
        Self {
            store: SubscriberStore::from_conf(&cfg.subscribers),
            points: cfg.points.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_indexes_both_ways() {
        let seeds = vec![SubscriberConf {
            imsi: "460001234567890".into(),
            username: "alice".into(),
            root_key: "465b5ce8b199b49faa5f0a2ee238a6bc".into(),
            opc: "cd63cb71954a9f4e48a5994e37a02baf".into(),
            apn: "ims.apn.3gpp.net".into(),
        }];
        let store = SubscriberStore::from_conf(&seeds);
        assert_eq!(store.len(), 1);
        assert_eq!(store.by_imsi("460001234567890").unwrap().username, "alice");
        assert_eq!(store.by_username("alice").unwrap().imsi, "460001234567890");
        assert!(store.by_imsi("nope").is_none());
    }
}
