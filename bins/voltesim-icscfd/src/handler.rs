//! SIP handlers of the I-CSCF.

use crate::context::IcscfContext;
use std::collections::HashMap;
use volte_core::kv::field;
use volte_core::package::epc_method;
use volte_core::{transport, EntityError, Outbox, Package, Peer, Route, Router};
use volte_sip::{status, Message, Method};

/// Dispatch table of the I-CSCF daemon.
pub fn routes() -> Router<IcscfContext> {
    let mut r = Router::new();
    r.register(Route::sip_request(), sip_request);
    r.register(Route::sip_response(), sip_response);
    r.seal();
    r
}

fn sip_request(ctx: &mut IcscfContext, pkg: Package, out: &mut Outbox) -> Result<(), EntityError> {
    let Some(text) = pkg.sip_text() else { return Ok(()) };
    let mut msg = Message::parse(text)?;
    msg.decrement_max_forwards();

    if matches!(msg.method(), Some(Method::Register)) {
        let user = msg.from.username().to_string();
        let hss = ctx.points.resolve("HSS")?;

        let mut fields = HashMap::new();
        fields.insert(field::USER_NAME.to_string(), user.clone());
        let uar = Package::epc_kv(
            epc_method::USER_AUTHORIZATION_REQUEST,
            &fields,
            Peer::Socket(hss),
        );
        match transport::request_reply(hss, &uar) {
            Ok(uaa) => {
                let scscf = uaa
                    .kv_payload()
                    .get(field::SCSCF)
                    .cloned()
                    .unwrap_or_default();
                log::info!("[I-CSCF] user {user} served by S-CSCF {scscf}");
            }
            Err(e) => {
                log::error!("[I-CSCF] HSS query for {user} failed: {e}");
                let mut timeout = Message::response(status::SERVER_TIMEOUT, &msg);
                timeout.access_network_info = msg.access_network_info.clone();
                out.push_down(Package::sip_response(timeout.to_string(), Peer::Logical("PCSCF".into())));
                return Err(e.into());
            }
        }
        msg.push_via(ctx.via_line());
        out.push_up(Package::sip_request(msg.to_string(), Peer::Logical("SCSCF".into())));
        return Ok(());
    }

    // Session requests, including those entering from the peer domain, go
    // to this domain's serving CSCF.
    msg.push_via(ctx.via_line());
    out.push_up(Package::sip_request(msg.to_string(), Peer::Logical("SCSCF".into())));
    Ok(())
}

fn sip_response(ctx: &mut IcscfContext, pkg: Package, out: &mut Outbox) -> Result<(), EntityError> {
    let _ = ctx;
    let Some(text) = pkg.sip_text() else { return Ok(()) };
    let mut msg = Message::parse(text)?;
    msg.pop_via();
    if msg.first_via().is_some_and(|v| v.contains("s-cscf")) {
        out.push_up(Package::sip_response(msg.to_string(), Peer::Logical("SCSCF".into())));
    } else {
        out.push_down(Package::sip_response(msg.to_string(), Peer::Logical("PCSCF".into())));
    }
    Ok(())
}
