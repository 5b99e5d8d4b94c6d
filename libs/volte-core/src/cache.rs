//! Session cache: pending registrations, expected digest responses,
//! registered-user records, and access-point address bindings.
//!
//! Every CSCF-role entity owns one instance; PGW and MME use the address
//! bindings. Expiry is lazy: a pending entry past its deadline is removed
//! on the read that finds it, no background sweeper runs.

use crate::error::CacheError;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Default lifetime of a pending registration.
pub const DEFAULT_TTL: Duration = Duration::from_secs(120);

/// Time source, injectable so tests can step past the TTL without
/// sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time. The default for every daemon.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { now: Mutex::new(Instant::now()) }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock poisoned");
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().expect("clock poisoned")
    }
}

/// Registered-subscriber state kept after a successful REGISTER.
/// Never TTL-expired; overwritten on re-registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Home network identifier.
    pub domain: String,
    /// Current radio attachment identifier, used to route terminating
    /// INVITEs back to the correct access leg.
    pub access_point: String,
}

struct Pending<R> {
    request: R,
    expected: Option<String>,
    deadline: Instant,
}

struct Inner<R> {
    pending: HashMap<String, Pending<R>>,
    users: HashMap<String, UserRecord>,
    addrs: HashMap<String, SocketAddr>,
}

/// Mutex-guarded store; safe for concurrent use from handlers.
pub struct SessionCache<R> {
    inner: Mutex<Inner<R>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl<R: Clone> Default for SessionCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Clone> SessionCache<R> {
    pub fn new() -> Self {
        Self::with_clock(DEFAULT_TTL, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                pending: HashMap::new(),
                users: HashMap::new(),
                addrs: HashMap::new(),
            }),
            clock,
            ttl,
        }
    }

    /// Insert a pending registration with the default TTL. Overwrites any
    /// existing entry for the key: the second REGISTER leg reuses the slot.
    pub fn put_pending(&self, key: &str, request: R) {
        let deadline = self.clock.now() + self.ttl;
        let mut inner = self.lock();
        inner.pending.insert(
            key.to_string(),
            Pending { request, expected: None, deadline },
        );
    }

    /// Fetch the pending request, expiring it lazily if the TTL lapsed.
    pub fn get_pending(&self, key: &str) -> Option<R> {
        let now = self.clock.now();
        let mut inner = self.lock();
        match inner.pending.get(key) {
            Some(entry) if now < entry.deadline => Some(entry.request.clone()),
            Some(_) => {
                inner.pending.remove(key);
                None
            }
            None => None,
        }
    }

    /// Attach the expected digest response to a live session. The deadline
    /// is left untouched: the remaining TTL of the original session keeps
    /// running, it is not re-armed to a fresh 120s.
    pub fn set_expected(&self, key: &str, value: impl Into<String>) -> Result<(), CacheError> {
        let now = self.clock.now();
        let mut inner = self.lock();
        match inner.pending.get_mut(key) {
            Some(entry) if now < entry.deadline => {
                entry.expected = Some(value.into());
                Ok(())
            }
            Some(_) => {
                inner.pending.remove(key);
                Err(CacheError::NotFoundRequest(key.to_string()))
            }
            None => Err(CacheError::NotFoundRequest(key.to_string())),
        }
    }

    /// Expected digest response for a live session.
    ///
    /// Outer `None`: no live session. `Some(None)`: session exists but the
    /// authority has not answered yet.
    pub fn get_expected(&self, key: &str) -> Option<Option<String>> {
        let now = self.clock.now();
        let mut inner = self.lock();
        match inner.pending.get(key) {
            Some(entry) if now < entry.deadline => Some(entry.expected.clone()),
            Some(_) => {
                inner.pending.remove(key);
                None
            }
            None => None,
        }
    }

    /// Remove a pending session on success or definitive failure.
    pub fn delete_pending(&self, key: &str) {
        self.lock().pending.remove(key);
    }

    /// Store a registered-user record, overwriting on re-registration.
    pub fn put_user(&self, key: &str, record: UserRecord) {
        self.lock().users.insert(key.to_string(), record);
    }

    pub fn get_user(&self, key: &str) -> Option<UserRecord> {
        self.lock().users.get(key).cloned()
    }

    /// Bind an access-point identifier to its current transport address.
    /// Heartbeats refresh this.
    pub fn bind_addr(&self, key: &str, addr: SocketAddr) {
        self.lock().addrs.insert(key.to_string(), addr);
    }

    pub fn addr_of(&self, key: &str) -> Option<SocketAddr> {
        self.lock().addrs.get(key).copied()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<R>> {
        self.inner.lock().expect("session cache poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_with_manual_clock() -> (SessionCache<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (SessionCache::with_clock(DEFAULT_TTL, clock.clone()), clock)
    }

    #[test]
    fn pending_round_trip() {
        let (cache, _) = cache_with_manual_clock();
        cache.put_pending("alice", "REGISTER ...".to_string());
        assert_eq!(cache.get_pending("alice").as_deref(), Some("REGISTER ..."));
    }

    #[test]
    fn pending_expires_lazily() {
        let (cache, clock) = cache_with_manual_clock();
        cache.put_pending("alice", "req".to_string());
        clock.advance(DEFAULT_TTL + Duration::from_secs(1));
        assert_eq!(cache.get_pending("alice"), None);
        // And the slot is really gone, not just hidden.
        assert!(matches!(
            cache.set_expected("alice", "x"),
            Err(CacheError::NotFoundRequest(_))
        ));
    }

    #[test]
    fn set_expected_requires_session() {
        let (cache, _) = cache_with_manual_clock();
        assert!(matches!(
            cache.set_expected("ghost", "abc"),
            Err(CacheError::NotFoundRequest(_))
        ));
    }

    #[test]
    fn set_expected_keeps_remaining_ttl() {
        let (cache, clock) = cache_with_manual_clock();
        cache.put_pending("alice", "req".to_string());
        clock.advance(DEFAULT_TTL - Duration::from_secs(10));
        cache.set_expected("alice", "abc123").unwrap();
        // 10s of the original TTL remain; 11s later the session is gone.
        clock.advance(Duration::from_secs(11));
        assert_eq!(cache.get_expected("alice"), None);
    }

    #[test]
    fn expected_distinguishes_no_session_from_no_answer() {
        let (cache, _) = cache_with_manual_clock();
        assert_eq!(cache.get_expected("alice"), None);
        cache.put_pending("alice", "req".to_string());
        assert_eq!(cache.get_expected("alice"), Some(None));
        cache.set_expected("alice", "abc123").unwrap();
        assert_eq!(cache.get_expected("alice"), Some(Some("abc123".to_string())));
    }

    #[test]
    fn second_register_overwrites_slot() {
        let (cache, _) = cache_with_manual_clock();
        cache.put_pending("alice", "first".to_string());
        cache.set_expected("alice", "abc").unwrap();
        cache.put_pending("alice", "second".to_string());
        // Overwrite resets the answer as well.
        assert_eq!(cache.get_expected("alice"), Some(None));
        assert_eq!(cache.get_pending("alice").as_deref(), Some("second"));
    }

    #[test]
    fn user_records_do_not_expire() {
        let (cache, clock) = cache_with_manual_clock();
        let rec = UserRecord { domain: "h.net".into(), access_point: "CELL0001".into() };
        cache.put_user("alice", rec.clone());
        clock.advance(DEFAULT_TTL * 10);
        assert_eq!(cache.get_user("alice"), Some(rec));
    }

    #[test]
    fn user_record_overwritten_on_reregistration() {
        let (cache, _) = cache_with_manual_clock();
        cache.put_user("alice", UserRecord { domain: "h.net".into(), access_point: "CELL0001".into() });
        cache.put_user("alice", UserRecord { domain: "h.net".into(), access_point: "CELL0002".into() });
        assert_eq!(cache.get_user("alice").unwrap().access_point, "CELL0002");
    }

    #[test]
    fn addr_bindings() {
        let (cache, _) = cache_with_manual_clock();
        let addr: SocketAddr = "10.1.2.3:9000".parse().unwrap();
        cache.bind_addr("CELL0001", addr);
        assert_eq!(cache.addr_of("CELL0001"), Some(addr));
        assert_eq!(cache.addr_of("CELL0002"), None);
    }
}
