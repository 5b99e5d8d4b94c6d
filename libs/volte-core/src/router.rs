//! The (protocol, method) dispatch table.
//!
//! Each entity owns one `Router` built at start-up and sealed before the
//! processing loop starts. Dispatch on an unregistered route logs and
//! drops the package; a handler panic is converted into an error at the
//! dispatch boundary so one bad package never kills the loop.

use crate::error::EntityError;
use crate::package::Package;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Output queues a handler writes into; the entity loop drains them to the
/// `up` (core-ward) and `down` (access-ward) channels after each dispatch.
#[derive(Debug, Default)]
pub struct Outbox {
    up: Vec<Package>,
    down: Vec<Package>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a package toward the home-network core.
    pub fn push_up(&mut self, pkg: Package) {
        self.up.push(pkg);
    }

    /// Queue a package toward the access/UE side.
    pub fn push_down(&mut self, pkg: Package) {
        self.down.push(pkg);
    }

    pub fn drain_up(&mut self) -> impl Iterator<Item = Package> + '_ {
        self.up.drain(..)
    }

    pub fn drain_down(&mut self) -> impl Iterator<Item = Package> + '_ {
        self.down.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.up.is_empty() && self.down.is_empty()
    }
}

/// Handler shape shared by all entities.
pub type Handler<C> = fn(&mut C, Package, &mut Outbox) -> Result<(), EntityError>;

/// Static route table mapping [`crate::Route`] to a handler.
pub struct Router<C> {
    table: HashMap<crate::Route, Handler<C>>,
    sealed: bool,
}

impl<C> Default for Router<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Router<C> {
    pub fn new() -> Self {
        Self { table: HashMap::new(), sealed: false }
    }

    /// Insert a handler. Last registration wins; registration after
    /// `seal()` is rejected and logged.
    pub fn register(&mut self, route: crate::Route, handler: Handler<C>) {
        if self.sealed {
            log::error!("route {:02x?} registered after seal, ignored", route);
            return;
        }
        self.table.insert(route, handler);
    }

    /// Freeze the table. Entities call this once the start-up registration
    /// pass is done.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Look up the package's route and run the handler inside a panic
    /// boundary. An unregistered route drops the package and returns `Ok`.
    pub fn dispatch(&self, ctx: &mut C, pkg: Package, out: &mut Outbox) -> Result<(), EntityError> {
        let route = pkg.route();
        let Some(handler) = self.table.get(&route) else {
            log::warn!("unhandled route ({:#04x}, {:#04x}), package dropped", route.protocol, route.method);
            return Ok(());
        };
        match catch_unwind(AssertUnwindSafe(|| handler(ctx, pkg, out))) {
            Ok(result) => result,
            Err(panic) => {
                let msg = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "opaque panic payload".to_string());
                Err(EntityError::HandlerPanic(msg))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
