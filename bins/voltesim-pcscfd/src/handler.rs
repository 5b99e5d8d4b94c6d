//! SIP handlers of the P-CSCF.

use crate::context::PcscfContext;
use volte_core::{EntityError, Outbox, Package, Peer, Route, Router};
use volte_sip::{status, Message, Method};

/// Dispatch table of the P-CSCF daemon.
pub fn routes() -> Router<PcscfContext> {
    let mut r = Router::new();
    r.register(Route::sip_request(), sip_request);
    r.register(Route::sip_response(), sip_response);
    r.seal();
    r
}

fn sip_request(ctx: &mut PcscfContext, pkg: Package, out: &mut Outbox) -> Result<(), EntityError> {
    let Some(text) = pkg.sip_text() else { return Ok(()) };
    let mut msg = Message::parse(text)?;
    msg.decrement_max_forwards();
    // Direction is decided on the arrival hop, before this proxy stamps
    // its own Via entry.
    let from_serving = msg.first_via().is_some_and(|v| v.contains("s-cscf"));

    match msg.method().cloned() {
        Some(Method::Register) => {
            let answered = msg
                .authorization
                .as_deref()
                .is_some_and(|a| a.contains("response"));
            if !answered {
                // Devices register bare; the edge supplies the initial
                // credential header the registrar expects.
                let user = msg.from.username();
                let domain = &msg.from.uri.domain;
                msg.authorization =
                    Some(format!("Digest username={user}@{domain}, integrity-protection=no"));
                log::info!("[P-CSCF] initial REGISTER from {user}, authorization stamped");
            }
            msg.push_via(ctx.via_line());
            out.push_up(Package::sip_request(msg.to_string(), Peer::Logical("ICSCF".into())));
        }
        _ if from_serving => {
            // Terminating leg: the S-CSCF hands the request down toward
            // the device behind the PGW.
            msg.push_via(ctx.via_line());
            out.push_down(Package::sip_request(msg.to_string(), Peer::Logical("PGW".into())));
        }
        method => {
            if matches!(method, Some(Method::Invite)) {
                let mut trying = Message::response(status::TRYING, &msg);
                // The PGW routes on the access-network info; keep the
                // caller's so the 100 retraces the access leg.
                trying.access_network_info = msg.access_network_info.clone();
                out.push_down(Package::sip_response(trying.to_string(), Peer::Logical("PGW".into())));
            }
            msg.push_via(ctx.via_line());
            out.push_up(Package::sip_request(msg.to_string(), Peer::Logical("SCSCF".into())));
        }
    }
    Ok(())
}

fn sip_response(ctx: &mut PcscfContext, pkg: Package, out: &mut Outbox) -> Result<(), EntityError> {
    let _ = ctx;
    let Some(text) = pkg.sip_text() else { return Ok(()) };
    let mut msg = Message::parse(text)?;
    msg.pop_via();
    if msg.first_via().is_some_and(|v| v.contains("s-cscf")) {
        out.push_up(Package::sip_response(msg.to_string(), Peer::Logical("SCSCF".into())));
    } else {
        out.push_down(Package::sip_response(msg.to_string(), Peer::Logical("PGW".into())));
    }
    Ok(())
}
