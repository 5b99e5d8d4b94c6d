//! UDP transport loops.
//!
//! One listener loop decodes datagrams onto the entity's `in` channel; one
//! drain loop per direction serializes `up`/`down` packages back to UDP,
//! resolving logical peers against the routing table. All loops stop
//! promptly on cancellation; in-flight sends complete.

use crate::codec;
use crate::config::Points;
use crate::error::TransportError;
use crate::package::{Package, Peer};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Deadline of the synchronous request/response primitive.
pub const REQUEST_DEADLINE: Duration = Duration::from_secs(5);

/// Largest datagram the listener accepts.
const MAX_DATAGRAM: usize = 10 * 1024;

/// Read datagrams from `sock`, decode, and feed the `in` channel.
/// Malformed frames are logged and dropped; the loop never dies on them.
pub async fn listener_loop(
    name: &str,
    sock: Arc<UdpSocket>,
    in_tx: mpsc::Sender<Package>,
    cancel: CancellationToken,
) {
    let mut buf = vec![0u8; MAX_DATAGRAM];
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                log::warn!("[{name}] listener loop exiting");
                return;
            }
            recv = sock.recv_from(&mut buf) => {
                let (n, src) = match recv {
                    Ok(pair) => pair,
                    Err(e) => {
                        log::error!("[{name}] socket read failed: {e}");
                        continue;
                    }
                };
                match codec::decode(&buf[..n], src) {
                    Ok(pkg) => {
                        // Backpressure point: a slow processing loop slows the reader.
                        if in_tx.send(pkg).await.is_err() {
                            log::warn!("[{name}] in channel closed, listener exiting");
                            return;
                        }
                    }
                    Err(e) => log::error!("[{name}] dropped undecodable datagram from {src}: {e}"),
                }
            }
        }
    }
}

/// Drain one output channel, resolving each package's peer and writing it
/// to the wire through the entity's own socket. Send failures are logged
/// and the message dropped; there is no store-and-forward retry layer.
pub async fn drain_loop(
    name: &str,
    direction: &str,
    sock: Arc<UdpSocket>,
    mut rx: mpsc::Receiver<Package>,
    points: Points,
    cancel: CancellationToken,
) {
    loop {
        let pkg = tokio::select! {
            _ = cancel.cancelled() => {
                log::warn!("[{name}] {direction} drain loop exiting");
                return;
            }
            pkg = rx.recv() => match pkg {
                Some(pkg) => pkg,
                None => {
                    log::warn!("[{name}] {direction} channel closed, drain loop exiting");
                    return;
                }
            },
        };
        let target = match resolve(&pkg.peer, &points) {
            Ok(addr) => addr,
            Err(e) => {
                log::error!("[{name}] cannot resolve peer for {direction} package: {e}");
                continue;
            }
        };
        let wire = codec::encode(&pkg);
        if let Err(e) = sock.send_to(&wire, target).await {
            log::error!("[{name}] {direction} send to {target} failed: {e}");
        }
    }
}

fn resolve(peer: &Peer, points: &Points) -> Result<SocketAddr, TransportError> {
    match peer {
        Peer::Socket(addr) => Ok(*addr),
        Peer::Logical(name) => Ok(points.resolve(name)?),
    }
}

/// Send one package and block for the peer's reply, with a fixed deadline.
///
/// Used for the single synchronous exchange in the system (I-CSCF asking
/// the HSS for an S-CSCF assignment). Runs on a plain ephemeral socket so
/// the reply cannot race the entity's listener. When called from a tokio
/// worker the blocking section is wrapped in `block_in_place` so the rest
/// of the runtime keeps moving.
pub fn request_reply(target: SocketAddr, pkg: &Package) -> Result<Package, TransportError> {
    let exchange = || -> Result<Package, TransportError> {
        let sock = std::net::UdpSocket::bind(("0.0.0.0", 0))?;
        sock.set_read_timeout(Some(REQUEST_DEADLINE))?;
        sock.send_to(&codec::encode(pkg), target)?;

        let mut buf = vec![0u8; MAX_DATAGRAM];
        let (n, src) = sock.recv_from(&mut buf).map_err(|e| {
            if matches!(e.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut) {
                TransportError::DeadlineExceeded(REQUEST_DEADLINE)
            } else {
                TransportError::Io(e)
            }
        })?;
        Ok(codec::decode(&buf[..n], src)?)
    };

    match tokio::runtime::Handle::try_current() {
        Ok(_) => tokio::task::block_in_place(exchange),
        Err(_) => exchange(),
    }
}
