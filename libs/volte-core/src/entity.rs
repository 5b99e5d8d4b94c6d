//! The common entity processing loop.
//!
//! Sequential dispatch: one handler completes before the next package is
//! read, so per-entity state beyond the session cache needs no extra
//! locking. Heartbeats are consumed before the router. Handler errors and
//! recovered panics are logged and the loop continues.

use crate::package::{Body, Package};
use crate::router::{Outbox, Router};
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Run the processing loop until cancellation or channel close.
///
/// `on_heartbeat` sees the sender's access-point identifier and source
/// address; entities that do not track bindings pass a no-op.
pub async fn run_loop<C>(
    name: &str,
    ctx: &mut C,
    router: &Router<C>,
    in_rx: &mut mpsc::Receiver<Package>,
    up_tx: &mpsc::Sender<Package>,
    down_tx: &mpsc::Sender<Package>,
    cancel: CancellationToken,
    mut on_heartbeat: impl FnMut(&mut C, &str, SocketAddr),
) {
    let mut out = Outbox::new();
    loop {
        let pkg = tokio::select! {
            _ = cancel.cancelled() => {
                log::warn!("[{name}] processing loop exiting");
                return;
            }
            pkg = in_rx.recv() => match pkg {
                Some(pkg) => pkg,
                None => {
                    log::warn!("[{name}] in channel closed, processing loop exiting");
                    return;
                }
            },
        };

        if let Body::Heartbeat { ref access_point } = pkg.body {
            if let Some(src) = pkg.source {
                log::debug!("[{name}] heartbeat from {access_point} at {src}");
                on_heartbeat(ctx, access_point, src);
            }
            continue;
        }

        let route = pkg.route();
        if let Err(e) = router.dispatch(ctx, pkg, &mut out) {
            log::error!(
                "[{name}] handler for ({:#04x}, {:#04x}) failed: {e}",
                route.protocol,
                route.method
            );
        }
        // Emit whatever the handler queued, errors included: a failed
        // handshake still answers its SIP peer.
        for pkg in out.drain_up() {
            if up_tx.send(pkg).await.is_err() {
                log::warn!("[{name}] up channel closed, processing loop exiting");
                return;
            }
        }
        for pkg in out.drain_down() {
            if down_tx.send(pkg).await.is_err() {
                log::warn!("[{name}] down channel closed, processing loop exiting");
                return;
            }
        }
    }
}
