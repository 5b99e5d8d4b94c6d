//! EPC and SIP handlers of the PGW.

use crate::context::PgwContext;
use std::net::SocketAddr;
use volte_core::kv::field;
use volte_core::package::epc_method;
use volte_core::{Body, EntityError, Outbox, Package, Peer, Route, Router};
use volte_sip::Message;

/// Dispatch table of the PGW daemon.
pub fn routes() -> Router<PgwContext> {
    let mut r = Router::new();
    r.register(Route::epc(epc_method::ATTACH_REQUEST), attach_request);
    r.register(Route::epc(epc_method::CREATE_SESSION_REQUEST), create_session_request);
    r.register(Route::sip_request(), relay_sip);
    r.register(Route::sip_response(), relay_sip);
    r.seal();
    r
}

/// Heartbeat hook: (re)bind the sending access point to its current
/// transport address.
pub fn on_heartbeat(ctx: &mut PgwContext, access_point: &str, src: SocketAddr) {
    ctx.bindings.bind_addr(access_point, src);
}

/// The cell identifier inside a `P-Access-Network-Info` value. Falls back
/// to the whole (trimmed) value so a bare cell id also matches the
/// heartbeat bindings.
fn cell_of(ani: &str) -> &str {
    const PARAM: &str = "utran-cell-id-3gpp=";
    match ani.find(PARAM) {
        Some(i) => ani[i + PARAM.len()..].split(';').next().unwrap_or("").trim(),
        None => ani.trim(),
    }
}

/// Direct attach from an access node: allocate a bearer address, bind the
/// node's address for later SIP relay, and accept in place.
fn attach_request(ctx: &mut PgwContext, pkg: Package, out: &mut Outbox) -> Result<(), EntityError> {
    let kvs = pkg.kv_payload();
    let ip = ctx.pool.allocate().ok_or(EntityError::NotEnoughIp)?;
    let cell = kvs.get(field::CELL_ID).cloned().unwrap_or_default();
    if let Some(src) = pkg.source {
        ctx.bindings.bind_addr(&cell, src);
    }

    let mut fields = kvs;
    fields.insert(field::IP.to_string(), ip.to_string());
    let peer = match pkg.source {
        Some(src) => Peer::Socket(src),
        None => Peer::Logical("ENB".into()),
    };
    log::info!("[PGW] bearer {ip} allocated for cell {cell} ({} left)", ctx.pool.remaining());
    out.push_down(Package::epc_kv(epc_method::ATTACH_ACCEPT, &fields, peer));
    Ok(())
}

/// Session setup handed over by the MME. The access binding is owned by
/// the heartbeat machinery; only the address comes from the pool here.
fn create_session_request(
    ctx: &mut PgwContext,
    pkg: Package,
    out: &mut Outbox,
) -> Result<(), EntityError> {
    let kvs = pkg.kv_payload();
    let ip = ctx.pool.allocate().ok_or(EntityError::NotEnoughIp)?;

    let mut fields = kvs;
    fields.insert(field::IP.to_string(), ip.to_string());
    let peer = match pkg.source {
        Some(src) => Peer::Socket(src),
        None => Peer::Logical("MME".into()),
    };
    log::info!(
        "[PGW] bearer {ip} allocated for IMSI {} ({} left)",
        fields.get(field::IMSI).map(String::as_str).unwrap_or("?"),
        ctx.pool.remaining()
    );
    out.push_up(Package::epc_kv(epc_method::CREATE_SESSION_RESPONSE, &fields, peer));
    Ok(())
}

/// SIP pivot. The message's `P-Access-Network-Info` names the cell; the
/// cached binding for that cell tells which side of the PGW the access leg
/// sits on. A message arriving *from* that address goes up to the P-CSCF,
/// anything else is core traffic relayed back down to the access leg.
fn relay_sip(ctx: &mut PgwContext, pkg: Package, out: &mut Outbox) -> Result<(), EntityError> {
    let Body::Sip { request, ref text } = pkg.body else {
        return Ok(());
    };
    let msg = Message::parse(text)?;
    let ani = msg.access_network_info.clone().unwrap_or_default();
    let cell = cell_of(&ani).to_string();

    let bound = ctx
        .bindings
        .addr_of(&cell)
        .ok_or_else(|| EntityError::CalleeNotExist(cell.clone()))?;

    let rebuild = |peer: Peer| {
        if request {
            Package::sip_request(text.clone(), peer)
        } else {
            Package::sip_response(text.clone(), peer)
        }
    };
    if pkg.source == Some(bound) {
        log::debug!("[PGW] sip from access leg {cell}, forwarding to P-CSCF");
        out.push_up(rebuild(Peer::Logical("PCSCF".into())));
    } else {
        log::debug!("[PGW] sip toward access leg {cell} at {bound}");
        out.push_down(rebuild(Peer::Socket(bound)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use volte_core::EntityConfig;

    const CONF: &str = r#"
listen: 127.0.0.1:5003
domain: hebei.mobile.3gpp.net
points:
  PCSCF: 127.0.0.1:6001
pool_cidr: 10.2.0.0/30
"#;

    const INVITE: &str = "INVITE sip:bob@hebei.mobile.3gpp.net SIP/2.0\r\n\
        Via: SIP/2.0/UDP 10.0.0.9:5060;branch=z9hG4bK1\r\n\
        From: <sip:alice@hebei.mobile.3gpp.net>;tag=1\r\n\
        To: <sip:bob@hebei.mobile.3gpp.net>\r\n\
        Call-ID: call-1\r\n\
        CSeq: 1 INVITE\r\n\
        Max-Forwards: 70\r\n\
        P-Access-Network-Info: 3GPP-UTRAN-TDD; utran-cell-id-3gpp=CELL0001\r\n\
        Content-Length: 0\r\n\r\n";

    fn ctx() -> PgwContext {
        PgwContext::new(&EntityConfig::from_str(CONF).unwrap()).unwrap()
    }

    fn kvmap(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn enb() -> SocketAddr {
        "10.9.9.1:7000".parse().unwrap()
    }

    #[test]
    fn cell_extraction() {
        assert_eq!(cell_of("3GPP-UTRAN-TDD; utran-cell-id-3gpp=CELL0001"), "CELL0001");
        assert_eq!(cell_of("utran-cell-id-3gpp=CELL0002;extra=1"), "CELL0002");
        assert_eq!(cell_of("CELL0003"), "CELL0003");
    }

    #[test]
    fn attach_allocates_and_binds() {
        let mut ctx = ctx();
        let mut out = Outbox::new();
        let mut req = Package::epc_kv(
            epc_method::ATTACH_REQUEST,
            &kvmap(&[(field::IMSI, "460001234567890"), (field::CELL_ID, "CELL0001")]),
            Peer::Logical("PGW".into()),
        );
        req.source = Some(enb());
        routes().dispatch(&mut ctx, req, &mut out).unwrap();

        let accept: Vec<Package> = out.drain_down().collect();
        assert_eq!(accept.len(), 1);
        assert_eq!(accept[0].peer, Peer::Socket(enb()));
        assert_eq!(accept[0].kv_payload()[field::IP], "10.2.0.1");
        assert_eq!(ctx.bindings.addr_of("CELL0001"), Some(enb()));
    }

    #[test]
    fn pool_exhaustion_surfaces_not_enough_ip() {
        let mut ctx = ctx(); // /30: two usable addresses
        let router = routes();
        for _ in 0..2 {
            let mut out = Outbox::new();
            let req = Package::epc_kv(
                epc_method::CREATE_SESSION_REQUEST,
                &kvmap(&[(field::IMSI, "460001234567890")]),
                Peer::Logical("PGW".into()),
            );
            router.dispatch(&mut ctx, req, &mut out).unwrap();
        }
        let mut out = Outbox::new();
        let req = Package::epc_kv(
            epc_method::CREATE_SESSION_REQUEST,
            &kvmap(&[(field::IMSI, "460001234567890")]),
            Peer::Logical("PGW".into()),
        );
        let err = router.dispatch(&mut ctx, req, &mut out).unwrap_err();
        assert!(matches!(err, EntityError::NotEnoughIp));
        assert!(out.is_empty());
    }

    #[test]
    fn sip_from_access_goes_up() {
        let mut ctx = ctx();
        let mut out = Outbox::new();
        on_heartbeat(&mut ctx, "CELL0001", enb());

        let mut pkg = Package::sip_request(INVITE, Peer::Logical("PGW".into()));
        pkg.source = Some(enb());
        routes().dispatch(&mut ctx, pkg, &mut out).unwrap();

        let up: Vec<Package> = out.drain_up().collect();
        assert_eq!(up.len(), 1);
        assert_eq!(up[0].peer, Peer::Logical("PCSCF".into()));
    }

    #[test]
    fn sip_from_core_goes_down_to_binding() {
        let mut ctx = ctx();
        let mut out = Outbox::new();
        on_heartbeat(&mut ctx, "CELL0001", enb());

        let pcscf: SocketAddr = "127.0.0.1:6001".parse().unwrap();
        let mut pkg = Package::sip_request(INVITE, Peer::Logical("PGW".into()));
        pkg.source = Some(pcscf);
        routes().dispatch(&mut ctx, pkg, &mut out).unwrap();

        let down: Vec<Package> = out.drain_down().collect();
        assert_eq!(down.len(), 1);
        assert_eq!(down[0].peer, Peer::Socket(enb()));
    }

    #[test]
    fn sip_without_binding_is_an_error() {
        let mut ctx = ctx();
        let mut out = Outbox::new();
        let mut pkg = Package::sip_request(INVITE, Peer::Logical("PGW".into()));
        pkg.source = Some(enb());
        let err = routes().dispatch(&mut ctx, pkg, &mut out).unwrap_err();
        assert!(matches!(err, EntityError::CalleeNotExist(ref c) if c == "CELL0001"));
    }

    #[test]
    fn heartbeat_refreshes_binding() {
        let mut ctx = ctx();
        on_heartbeat(&mut ctx, "CELL0001", enb());
        let moved: SocketAddr = "10.9.9.2:7000".parse().unwrap();
        on_heartbeat(&mut ctx, "CELL0001", moved);
        assert_eq!(ctx.bindings.addr_of("CELL0001"), Some(moved));
    }
}
