//! Relay handlers of the eNodeB.

use crate::context::EnbContext;
use volte_core::kv::field;
use volte_core::package::epc_method;
use volte_core::{kv, Body, EntityError, Outbox, Package, Peer, Route, Router};

/// Dispatch table of the eNodeB. Every route it relays is registered
/// explicitly; direction is decided per package from the source address.
pub fn routes() -> Router<EnbContext> {
    let mut r = Router::new();
    for method in [
        epc_method::ATTACH_REQUEST,
        epc_method::AUTHENTICATION_REQUEST,
        epc_method::AUTHENTICATION_RESPONSE,
        epc_method::ATTACH_ACCEPT,
    ] {
        r.register(Route::epc(method), relay_epc);
    }
    r.register(Route::sip_request(), relay_sip);
    r.register(Route::sip_response(), relay_sip);
    r.seal();
    r
}

fn device_peer(ctx: &EnbContext) -> Result<Peer, EntityError> {
    ctx.ue_addr
        .map(Peer::Socket)
        .ok_or_else(|| EntityError::CalleeNotExist("no device attached".to_string()))
}

/// EPC relay: uplink goes to the MME with the cell id stamped onto attach
/// requests, downlink goes back to the device.
fn relay_epc(ctx: &mut EnbContext, pkg: Package, out: &mut Outbox) -> Result<(), EntityError> {
    let Body::Epc { method, ref payload } = pkg.body else { return Ok(()) };

    if pkg.source.is_some_and(|src| ctx.is_core(src)) {
        let peer = device_peer(ctx)?;
        out.push_down(Package::epc(method, payload.clone(), peer));
        return Ok(());
    }

    ctx.ue_addr = pkg.source;
    if method == epc_method::ATTACH_REQUEST {
        let mut fields = kv::unmarshal(payload);
        fields.insert(field::CELL_ID.to_string(), ctx.cell_id.clone());
        out.push_up(Package::epc_kv(method, &fields, Peer::Logical("MME".into())));
    } else {
        out.push_up(Package::epc(method, payload.clone(), Peer::Logical("MME".into())));
    }
    Ok(())
}

/// SIP relay: uplink to the PGW, downlink back to the device. The text is
/// never touched; the eNodeB is not a SIP hop.
fn relay_sip(ctx: &mut EnbContext, pkg: Package, out: &mut Outbox) -> Result<(), EntityError> {
    let Body::Sip { request, ref text } = pkg.body else { return Ok(()) };

    let rebuild = |peer: Peer| {
        if request {
            Package::sip_request(text.clone(), peer)
        } else {
            Package::sip_response(text.clone(), peer)
        }
    };
    if pkg.source.is_some_and(|src| ctx.is_core(src)) {
        let peer = device_peer(ctx)?;
        out.push_down(rebuild(peer));
    } else {
        ctx.ue_addr = pkg.source;
        out.push_up(rebuild(Peer::Logical("PGW".into())));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use volte_core::EntityConfig;

    fn ctx() -> EnbContext {
        EnbContext::new(
            &EntityConfig::from_str(
                "listen: 127.0.0.1:7000\ndomain: hebei.mobile.3gpp.net\ncell_id: CELL0001\n\
                 points:\n  MME: 127.0.0.1:5002\n  PGW: 127.0.0.1:5003\n",
            )
            .unwrap(),
        )
    }

    fn ue() -> SocketAddr {
        "10.0.0.9:5060".parse().unwrap()
    }

    fn mme() -> SocketAddr {
        "127.0.0.1:5002".parse().unwrap()
    }

    #[test]
    fn uplink_attach_gets_cell_id_stamped() {
        let mut ctx = ctx();
        let mut out = Outbox::new();
        let fields: HashMap<String, String> =
            [(field::IMSI.to_string(), "460001234567890".to_string())].into();
        let mut pkg = Package::epc_kv(epc_method::ATTACH_REQUEST, &fields, Peer::Logical("ENB".into()));
        pkg.source = Some(ue());
        routes().dispatch(&mut ctx, pkg, &mut out).unwrap();

        let fwd: Vec<Package> = out.drain_up().collect();
        assert_eq!(fwd.len(), 1);
        assert_eq!(fwd[0].peer, Peer::Logical("MME".into()));
        let kvs = fwd[0].kv_payload();
        assert_eq!(kvs[field::CELL_ID], "CELL0001");
        assert_eq!(kvs[field::IMSI], "460001234567890");
        assert_eq!(ctx.ue_addr, Some(ue()));
    }

    #[test]
    fn downlink_goes_to_last_seen_device() {
        let mut ctx = ctx();
        let router = routes();

        let mut out = Outbox::new();
        let mut attach = Package::epc_kv(
            epc_method::ATTACH_REQUEST,
            &HashMap::new(),
            Peer::Logical("ENB".into()),
        );
        attach.source = Some(ue());
        router.dispatch(&mut ctx, attach, &mut out).unwrap();
        let _ = out.drain_up().count();

        let mut challenge = Package::epc_kv(
            epc_method::AUTHENTICATION_REQUEST,
            &HashMap::new(),
            Peer::Logical("ENB".into()),
        );
        challenge.source = Some(mme());
        router.dispatch(&mut ctx, challenge, &mut out).unwrap();

        let down: Vec<Package> = out.drain_down().collect();
        assert_eq!(down.len(), 1);
        assert_eq!(down[0].peer, Peer::Socket(ue()));
    }

    #[test]
    fn downlink_without_device_is_an_error() {
        let mut ctx = ctx();
        let mut out = Outbox::new();
        let mut pkg = Package::epc_kv(
            epc_method::ATTACH_ACCEPT,
            &HashMap::new(),
            Peer::Logical("ENB".into()),
        );
        pkg.source = Some(mme());
        let err = routes().dispatch(&mut ctx, pkg, &mut out).unwrap_err();
        assert!(matches!(err, EntityError::CalleeNotExist(_)));
    }

    #[test]
    fn sip_from_device_goes_to_pgw() {
        let mut ctx = ctx();
        let mut out = Outbox::new();
        let mut pkg = Package::sip_request(
            "REGISTER sip:hebei.mobile.3gpp.net SIP/2.0\r\n\r\n",
            Peer::Logical("ENB".into()),
        );
        pkg.source = Some(ue());
        routes().dispatch(&mut ctx, pkg, &mut out).unwrap();

        let fwd: Vec<Package> = out.drain_up().collect();
        assert_eq!(fwd.len(), 1);
        assert_eq!(fwd[0].peer, Peer::Logical("PGW".into()));
        assert_eq!(ctx.ue_addr, Some(ue()));
    }
}
