//! SIP and EPC handlers of the S-CSCF.

use crate::context::ScscfContext;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine as _;
use std::collections::HashMap;
use volte_core::kv::field;
use volte_core::package::epc_method;
use volte_core::{EntityError, Outbox, Package, Peer, Route, Router, UserRecord};
use volte_sip::{parse_digest, status, Message, Method, NameAddr, Uri};

/// Dispatch table of the S-CSCF daemon.
pub fn routes() -> Router<ScscfContext> {
    let mut r = Router::new();
    r.register(Route::sip_request(), sip_request);
    r.register(Route::sip_response(), sip_response);
    r.register(
        Route::epc(epc_method::MULTIMEDIA_AUTHENTICATION_ANSWER),
        multimedia_authentication_answer,
    );
    r.seal();
    r
}

fn sip_request(ctx: &mut ScscfContext, pkg: Package, out: &mut Outbox) -> Result<(), EntityError> {
    let Some(text) = pkg.sip_text() else { return Ok(()) };
    let mut msg = Message::parse(text)?;
    msg.decrement_max_forwards();
    match msg.method().cloned() {
        Some(Method::Register) => register(ctx, msg, out),
        _ => session_request(ctx, msg, out),
    }
}

/// The two-pass registrar. Pass one (no `response` in the credential)
/// opens a pending session and asks the HSS for a vector; pass two checks
/// the device's RES against the cached XRES.
fn register(ctx: &mut ScscfContext, msg: Message, out: &mut Outbox) -> Result<(), EntityError> {
    let user = msg.from.username().to_string();
    let params = parse_digest(msg.authorization.as_deref().unwrap_or(""));

    if let Some(given) = params.get("response") {
        // Pass two, but only when a live session holds an expected value.
        // A lone challenge-response with no session (lapsed, or answered
        // before the vector arrived) restarts the handshake instead.
        if let Some(Some(expected)) = ctx.sessions.get_expected(&user) {
            return verify(ctx, msg, &user, given, &expected, out);
        }
        log::warn!("[S-CSCF] challenge-response from {user} without live session, restarting");
    }

    ctx.sessions.put_pending(&user, msg);
    let mut fields = HashMap::new();
    fields.insert(field::USER_NAME.to_string(), user.clone());
    log::info!("[S-CSCF] registration opened for {user}, vector requested");
    out.push_up(Package::epc_kv(
        epc_method::MULTIMEDIA_AUTHENTICATION_REQUEST,
        &fields,
        Peer::Logical("HSS".into()),
    ));
    Ok(())
}

fn verify(
    ctx: &mut ScscfContext,
    msg: Message,
    user: &str,
    given: &str,
    expected: &str,
    out: &mut Outbox,
) -> Result<(), EntityError> {
    // Devices answer with the base64 (unpadded) RES bytes; the cached
    // expectation is the HSS's hex. Compare in hex.
    let given_hex = match STANDARD_NO_PAD.decode(given) {
        Ok(bytes) => hex::encode(bytes),
        Err(_) => String::new(),
    };

    if given_hex == expected {
        ctx.sessions.delete_pending(user);
        ctx.sessions.put_user(
            user,
            UserRecord {
                domain: msg.from.uri.domain.clone(),
                access_point: msg.access_network_info.clone().unwrap_or_default(),
            },
        );
        let mut ok = Message::response(status::OK, &msg);
        ok.access_network_info = msg.access_network_info.clone();
        ok.service_route = Some(format!("<sip:s-cscf.{}:{}>", ctx.domain, ctx.port));
        log::info!("[S-CSCF] {user} registered");
        out.push_down(Package::sip_response(ok.to_string(), Peer::Logical("ICSCF".into())));
        Ok(())
    } else {
        // Terminal: the attempt is over, the device must re-register.
        ctx.sessions.delete_pending(user);
        let mut unauthorized = Message::response(status::UNAUTHORIZED, &msg);
        unauthorized.access_network_info = msg.access_network_info.clone();
        out.push_down(Package::sip_response(
            unauthorized.to_string(),
            Peer::Logical("ICSCF".into()),
        ));
        Err(EntityError::AuthenFailed(user.to_string()))
    }
}

/// MAA from the HSS: cache the expected RES and turn RAND/AUTN into the
/// 401 challenge for the waiting device.
fn multimedia_authentication_answer(
    ctx: &mut ScscfContext,
    pkg: Package,
    out: &mut Outbox,
) -> Result<(), EntityError> {
    let kvs = pkg.kv_payload();
    let user = kvs.get(field::USER_NAME).cloned().unwrap_or_default();

    let Some(req) = ctx.sessions.get_pending(&user) else {
        // The session lapsed while the vector was in flight; the device
        // has to start the handshake over.
        let gone = expired_response(ctx, &user);
        out.push_down(Package::sip_response(gone.to_string(), Peer::Logical("ICSCF".into())));
        return Err(EntityError::RequestExpired(user));
    };

    let xres = kvs
        .get(field::XRES)
        .ok_or_else(|| EntityError::BadKeyMaterial(format!("vector for {user} lacks XRES")))?;
    let rand = hex::decode(kvs.get(field::RAND).map(String::as_str).unwrap_or(""))
        .map_err(|e| EntityError::BadKeyMaterial(format!("RAND for {user}: {e}")))?;
    let autn = hex::decode(kvs.get(field::AUTN).map(String::as_str).unwrap_or(""))
        .map_err(|e| EntityError::BadKeyMaterial(format!("AUTN for {user}: {e}")))?;
    ctx.sessions.set_expected(&user, xres.to_lowercase())?;

    let mut material = rand;
    material.extend_from_slice(&autn);
    let nonce = STANDARD.encode(material);

    let mut challenge = Message::response(status::UNAUTHORIZED, &req);
    challenge.www_authenticate = Some(format!(
        "Digest realm={}, nonce={}, algorithm=AKAv1-MD5, qop=auth-int",
        ctx.domain, nonce
    ));
    challenge.access_network_info = req.access_network_info.clone();
    log::info!("[S-CSCF] challenging {user}");
    out.push_down(Package::sip_response(challenge.to_string(), Peer::Logical("ICSCF".into())));
    Ok(())
}

/// 410 for a device whose original request is no longer cached. Built
/// from a stub since there is nothing left to correlate with.
fn expired_response(ctx: &ScscfContext, user: &str) -> Message {
    let mut stub = Message::request(Method::Register, Uri::new("", ctx.domain.clone()));
    stub.from = NameAddr {
        display: None,
        uri: Uri::new(user, ctx.domain.clone()),
        params: String::new(),
    };
    stub.to = stub.from.clone();
    Message::response(status::GONE, &stub)
}

/// Session requests. Requests arriving from another CSCF (peer domain's
/// serving CSCF, or the interrogating hop) are terminating legs routed to
/// the local callee; requests from the own access edge are originating
/// legs routed by the callee's domain.
fn session_request(ctx: &mut ScscfContext, mut msg: Message, out: &mut Outbox) -> Result<(), EntityError> {
    let from_peer = msg
        .first_via()
        .is_some_and(|v| v.contains("s-cscf") || v.contains("i-cscf"));
    let callee = msg
        .request_uri()
        .map(|u| u.username.clone())
        .unwrap_or_default();

    if from_peer {
        return match ctx.sessions.get_user(&callee) {
            Some(rec) => {
                msg.access_network_info = Some(rec.access_point);
                msg.push_via(ctx.via_line());
                out.push_down(Package::sip_request(msg.to_string(), Peer::Logical("PCSCF".into())));
                Ok(())
            }
            None => {
                let terminated = Message::response(status::REQUEST_TERMINATED, &msg);
                out.push_up(Package::sip_response(
                    terminated.to_string(),
                    Peer::Logical("OTHER".into()),
                ));
                Err(EntityError::CalleeNotExist(callee))
            }
        };
    }

    let callee_domain = msg
        .request_uri()
        .map(|u| u.domain.clone())
        .unwrap_or_default();
    if callee_domain != ctx.domain {
        log::debug!("[S-CSCF] routing {callee}@{callee_domain} to the peer domain");
        msg.push_via(ctx.via_line());
        out.push_up(Package::sip_request(msg.to_string(), Peer::Logical("OTHER".into())));
        return Ok(());
    }

    match ctx.sessions.get_user(&callee) {
        Some(rec) => {
            msg.access_network_info = Some(rec.access_point);
            msg.push_via(ctx.via_line());
            out.push_down(Package::sip_request(msg.to_string(), Peer::Logical("PCSCF".into())));
            Ok(())
        }
        None => {
            let mut terminated = Message::response(status::REQUEST_TERMINATED, &msg);
            terminated.access_network_info = msg.access_network_info.clone();
            out.push_down(Package::sip_response(
                terminated.to_string(),
                Peer::Logical("PCSCF".into()),
            ));
            Err(EntityError::CalleeNotExist(callee))
        }
    }
}

/// Responses relayed through this hop: pop the own `Via`, then either hand
/// the response back to the peer domain or descend toward the caller,
/// restoring the caller's attachment point for the access-edge hop.
fn sip_response(ctx: &mut ScscfContext, pkg: Package, out: &mut Outbox) -> Result<(), EntityError> {
    let Some(text) = pkg.sip_text() else { return Ok(()) };
    let mut msg = Message::parse(text)?;
    msg.pop_via();
    if msg.first_via().is_some_and(|v| v.contains("s-cscf")) {
        out.push_up(Package::sip_response(msg.to_string(), Peer::Logical("OTHER".into())));
    } else {
        if let Some(rec) = ctx.sessions.get_user(msg.from.username()) {
            msg.access_network_info = Some(rec.access_point);
        }
        out.push_down(Package::sip_response(msg.to_string(), Peer::Logical("PCSCF".into())));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use volte_core::cache::{ManualClock, DEFAULT_TTL};
    use volte_core::EntityConfig;

    const CONF: &str = "listen: 127.0.0.1:6003\ndomain: hebei.mobile.3gpp.net\n";
    const XRES_HEX: &str = "a54211d5e3ba50bf";
    const RAND_HEX: &str = "23553cbe9637a89d218ae64dae47bf35";
    const AUTN_HEX: &str = "ab689c6483710000f0e0d0c0b0a09080";

    fn ctx_with_clock() -> (ScscfContext, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cfg = EntityConfig::from_str(CONF).unwrap();
        (ScscfContext::with_clock(&cfg, DEFAULT_TTL, clock.clone()), clock)
    }

    fn register_text(auth: &str) -> String {
        format!(
            "REGISTER sip:hebei.mobile.3gpp.net SIP/2.0\r\n\
             Via: SIP/2.0/UDP i-cscf.hebei.mobile.3gpp.net:6002;branch=z9hG4bK2\r\n\
             Via: SIP/2.0/UDP p-cscf.hebei.mobile.3gpp.net:6001;branch=z9hG4bK1\r\n\
             Via: SIP/2.0/UDP 10.0.0.9:5060;branch=z9hG4bK0\r\n\
             From: <sip:alice@hebei.mobile.3gpp.net>;tag=1\r\n\
             To: <sip:alice@hebei.mobile.3gpp.net>\r\n\
             Call-ID: reg-1\r\n\
             CSeq: 1 REGISTER\r\n\
             Max-Forwards: 68\r\n\
             Authorization: {auth}\r\n\
             P-Access-Network-Info: 3GPP-UTRAN-TDD; utran-cell-id-3gpp=CELL0001\r\n\
             Content-Length: 0\r\n\r\n"
        )
    }

    fn maa_package() -> Package {
        let fields: HashMap<String, String> = [
            (field::USER_NAME, "alice"),
            (field::RAND, RAND_HEX),
            (field::AUTN, AUTN_HEX),
            (field::XRES, "A54211D5E3BA50BF"),
            (field::CK, "b40ba9a3c58b2a05bbf0d987b21bf8cb"),
            (field::IK, "f769bcd751044604127672711c6d3441"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Package::epc_kv(epc_method::MULTIMEDIA_AUTHENTICATION_ANSWER, &fields, Peer::Logical("SCSCF".into()))
    }

    fn device_response() -> String {
        STANDARD_NO_PAD.encode(hex::decode(XRES_HEX).unwrap())
    }

    fn single(iter: impl Iterator<Item = Package>) -> Package {
        let mut v: Vec<Package> = iter.collect();
        assert_eq!(v.len(), 1);
        v.pop().unwrap()
    }

    #[test]
    fn registration_handshake_end_to_end() {
        let (mut ctx, _clock) = ctx_with_clock();
        let router = routes();
        let mut out = Outbox::new();

        // Pass 1: REGISTER opens the session and asks the HSS.
        let first = register_text("Digest username=alice@hebei.mobile.3gpp.net, integrity-protection=no");
        router
            .dispatch(&mut ctx, Package::sip_request(first, Peer::Logical("SCSCF".into())), &mut out)
            .unwrap();
        let mar = single(out.drain_up());
        assert_eq!(mar.peer, Peer::Logical("HSS".into()));
        assert_eq!(mar.kv_payload()[field::USER_NAME], "alice");

        // MAA turns into the 401 challenge carrying RAND||AUTN as nonce.
        router.dispatch(&mut ctx, maa_package(), &mut out).unwrap();
        let challenge = single(out.drain_down());
        let challenge_msg = Message::parse(challenge.sip_text().unwrap()).unwrap();
        assert_eq!(challenge_msg.status_code(), Some(status::UNAUTHORIZED));
        let www = challenge_msg.www_authenticate.unwrap();
        let nonce = parse_digest(&www)["nonce"].clone();
        let material = STANDARD.decode(nonce).unwrap();
        assert_eq!(hex::encode(&material[..16]), RAND_HEX);
        assert_eq!(hex::encode(&material[16..]), AUTN_HEX);

        // Pass 2: the device echoes RES; registration completes.
        let second = register_text(&format!(
            "Digest username=alice@hebei.mobile.3gpp.net, response={}, algorithm=AKAv1-MD5",
            device_response()
        ));
        router
            .dispatch(&mut ctx, Package::sip_request(second, Peer::Logical("SCSCF".into())), &mut out)
            .unwrap();
        let ok = single(out.drain_down());
        let ok_msg = Message::parse(ok.sip_text().unwrap()).unwrap();
        assert_eq!(ok_msg.status_code(), Some(status::OK));
        assert!(ok_msg.service_route.unwrap().contains("s-cscf"));

        let rec = ctx.sessions.get_user("alice").unwrap();
        assert_eq!(rec.domain, "hebei.mobile.3gpp.net");
        assert!(rec.access_point.contains("CELL0001"));
        // The pending slot is gone once registered.
        assert!(ctx.sessions.get_pending("alice").is_none());
    }

    #[test]
    fn vector_after_ttl_gets_410_gone() {
        let (mut ctx, clock) = ctx_with_clock();
        let router = routes();
        let mut out = Outbox::new();

        let first = register_text("Digest username=alice@hebei.mobile.3gpp.net, integrity-protection=no");
        router
            .dispatch(&mut ctx, Package::sip_request(first, Peer::Logical("SCSCF".into())), &mut out)
            .unwrap();
        let _ = out.drain_up().count();

        clock.advance(DEFAULT_TTL + Duration::from_secs(1));
        let err = router.dispatch(&mut ctx, maa_package(), &mut out).unwrap_err();
        assert!(matches!(err, EntityError::RequestExpired(_)));

        let gone = single(out.drain_down());
        let msg = Message::parse(gone.sip_text().unwrap()).unwrap();
        assert_eq!(msg.status_code(), Some(status::GONE));
    }

    #[test]
    fn wrong_res_is_terminal_401() {
        let (mut ctx, _clock) = ctx_with_clock();
        let router = routes();
        let mut out = Outbox::new();

        let first = register_text("Digest username=alice@hebei.mobile.3gpp.net, integrity-protection=no");
        router
            .dispatch(&mut ctx, Package::sip_request(first, Peer::Logical("SCSCF".into())), &mut out)
            .unwrap();
        router.dispatch(&mut ctx, maa_package(), &mut out).unwrap();
        let _ = out.drain_up().count();
        let _ = out.drain_down().count();

        let forged = STANDARD_NO_PAD.encode(hex::decode("deadbeefdeadbeef").unwrap());
        let second = register_text(&format!(
            "Digest username=alice@hebei.mobile.3gpp.net, response={forged}, algorithm=AKAv1-MD5"
        ));
        let err = router
            .dispatch(&mut ctx, Package::sip_request(second, Peer::Logical("SCSCF".into())), &mut out)
            .unwrap_err();
        assert!(matches!(err, EntityError::AuthenFailed(_)));

        let resp = single(out.drain_down());
        let msg = Message::parse(resp.sip_text().unwrap()).unwrap();
        assert_eq!(msg.status_code(), Some(status::UNAUTHORIZED));
        // Terminal: no challenge, and the session is gone.
        assert!(msg.www_authenticate.is_none());
        assert!(ctx.sessions.get_pending("alice").is_none());
        assert!(ctx.sessions.get_user("alice").is_none());
    }

    #[test]
    fn challenge_response_without_session_restarts() {
        let (mut ctx, _clock) = ctx_with_clock();
        let mut out = Outbox::new();
        let second = register_text(&format!(
            "Digest username=alice@hebei.mobile.3gpp.net, response={}, algorithm=AKAv1-MD5",
            device_response()
        ));
        routes()
            .dispatch(&mut ctx, Package::sip_request(second, Peer::Logical("SCSCF".into())), &mut out)
            .unwrap();
        // Treated as a fresh first pass: a new MAR goes out.
        let mar = single(out.drain_up());
        assert_eq!(mar.peer, Peer::Logical("HSS".into()));
        assert!(ctx.sessions.get_pending("alice").is_some());
    }

    fn invite_text(first_via: &str, callee: &str) -> String {
        format!(
            "INVITE sip:{callee} SIP/2.0\r\n\
             Via: {first_via}\r\n\
             Via: SIP/2.0/UDP 10.0.0.9:5060;branch=z9hG4bK0\r\n\
             From: <sip:alice@hebei.mobile.3gpp.net>;tag=1\r\n\
             To: <sip:{callee}>\r\n\
             Call-ID: call-1\r\n\
             CSeq: 1 INVITE\r\n\
             Max-Forwards: 68\r\n\
             P-Access-Network-Info: 3GPP-UTRAN-TDD; utran-cell-id-3gpp=CELL0001\r\n\
             Content-Length: 0\r\n\r\n"
        )
    }

    const PCSCF_VIA: &str = "SIP/2.0/UDP p-cscf.hebei.mobile.3gpp.net:6001;branch=z9hG4bK1";

    #[test]
    fn same_domain_invite_routes_down_with_callee_attachment() {
        let (mut ctx, _clock) = ctx_with_clock();
        ctx.sessions.put_user(
            "bob",
            UserRecord {
                domain: "hebei.mobile.3gpp.net".into(),
                access_point: "3GPP-UTRAN-TDD; utran-cell-id-3gpp=CELL0002".into(),
            },
        );
        let mut out = Outbox::new();
        let invite = invite_text(PCSCF_VIA, "bob@hebei.mobile.3gpp.net");
        routes()
            .dispatch(&mut ctx, Package::sip_request(invite, Peer::Logical("SCSCF".into())), &mut out)
            .unwrap();

        let fwd = single(out.drain_down());
        assert_eq!(fwd.peer, Peer::Logical("PCSCF".into()));
        let msg = Message::parse(fwd.sip_text().unwrap()).unwrap();
        assert!(msg.first_via().unwrap().contains("s-cscf"));
        assert!(msg.access_network_info.unwrap().contains("CELL0002"));
    }

    #[test]
    fn absent_callee_gets_request_terminated() {
        let (mut ctx, _clock) = ctx_with_clock();
        let mut out = Outbox::new();
        let invite = invite_text(PCSCF_VIA, "ghost@hebei.mobile.3gpp.net");
        let err = routes()
            .dispatch(&mut ctx, Package::sip_request(invite, Peer::Logical("SCSCF".into())), &mut out)
            .unwrap_err();
        assert!(matches!(err, EntityError::CalleeNotExist(ref c) if c == "ghost"));

        let resp = single(out.drain_down());
        let msg = Message::parse(resp.sip_text().unwrap()).unwrap();
        assert_eq!(msg.status_code(), Some(status::REQUEST_TERMINATED));
    }

    #[test]
    fn cross_domain_invite_goes_to_peer() {
        let (mut ctx, _clock) = ctx_with_clock();
        let mut out = Outbox::new();
        let invite = invite_text(PCSCF_VIA, "carol@cq.telecom.3gpp.net");
        routes()
            .dispatch(&mut ctx, Package::sip_request(invite, Peer::Logical("SCSCF".into())), &mut out)
            .unwrap();

        let fwd = single(out.drain_up());
        assert_eq!(fwd.peer, Peer::Logical("OTHER".into()));
        let msg = Message::parse(fwd.sip_text().unwrap()).unwrap();
        assert!(msg.first_via().unwrap().contains("s-cscf.hebei"));
    }

    #[test]
    fn terminating_invite_from_peer_is_delivered_or_refused() {
        let (mut ctx, _clock) = ctx_with_clock();
        let router = routes();
        let peer_via = "SIP/2.0/UDP s-cscf.cq.telecom.3gpp.net:6003;branch=z9hG4bK9";

        // Registered callee: delivered down the access edge.
        ctx.sessions.put_user(
            "bob",
            UserRecord {
                domain: "hebei.mobile.3gpp.net".into(),
                access_point: "3GPP-UTRAN-TDD; utran-cell-id-3gpp=CELL0002".into(),
            },
        );
        let mut out = Outbox::new();
        let invite = invite_text(peer_via, "bob@hebei.mobile.3gpp.net");
        router
            .dispatch(&mut ctx, Package::sip_request(invite, Peer::Logical("SCSCF".into())), &mut out)
            .unwrap();
        assert_eq!(single(out.drain_down()).peer, Peer::Logical("PCSCF".into()));

        // Unknown callee: 487 straight back to the peer domain.
        let mut out = Outbox::new();
        let invite = invite_text(peer_via, "ghost@hebei.mobile.3gpp.net");
        let err = router
            .dispatch(&mut ctx, Package::sip_request(invite, Peer::Logical("SCSCF".into())), &mut out)
            .unwrap_err();
        assert!(matches!(err, EntityError::CalleeNotExist(_)));
        let resp = single(out.drain_up());
        assert_eq!(resp.peer, Peer::Logical("OTHER".into()));
        let msg = Message::parse(resp.sip_text().unwrap()).unwrap();
        assert_eq!(msg.status_code(), Some(status::REQUEST_TERMINATED));
    }

    #[test]
    fn response_descends_with_caller_attachment_restored() {
        let (mut ctx, _clock) = ctx_with_clock();
        ctx.sessions.put_user(
            "alice",
            UserRecord {
                domain: "hebei.mobile.3gpp.net".into(),
                access_point: "3GPP-UTRAN-TDD; utran-cell-id-3gpp=CELL0001".into(),
            },
        );
        let mut out = Outbox::new();
        let resp = "SIP/2.0 200 OK\r\n\
            Via: SIP/2.0/UDP s-cscf.hebei.mobile.3gpp.net:6003;branch=z9hG4bK3\r\n\
            Via: SIP/2.0/UDP p-cscf.hebei.mobile.3gpp.net:6001;branch=z9hG4bK1\r\n\
            Via: SIP/2.0/UDP 10.0.0.9:5060;branch=z9hG4bK0\r\n\
            From: <sip:alice@hebei.mobile.3gpp.net>;tag=1\r\n\
            To: <sip:bob@hebei.mobile.3gpp.net>;tag=2\r\n\
            Call-ID: call-1\r\nCSeq: 1 INVITE\r\n\r\n";
        routes()
            .dispatch(&mut ctx, Package::sip_response(resp, Peer::Logical("SCSCF".into())), &mut out)
            .unwrap();

        let fwd = single(out.drain_down());
        assert_eq!(fwd.peer, Peer::Logical("PCSCF".into()));
        let msg = Message::parse(fwd.sip_text().unwrap()).unwrap();
        assert!(msg.first_via().unwrap().contains("p-cscf"));
        assert!(msg.access_network_info.unwrap().contains("CELL0001"));
    }

    #[test]
    fn cross_domain_response_returns_to_peer() {
        let (mut ctx, _clock) = ctx_with_clock();
        let mut out = Outbox::new();
        let resp = "SIP/2.0 200 OK\r\n\
            Via: SIP/2.0/UDP s-cscf.hebei.mobile.3gpp.net:6003;branch=z9hG4bK3\r\n\
            Via: SIP/2.0/UDP s-cscf.cq.telecom.3gpp.net:6003;branch=z9hG4bK9\r\n\
            Via: SIP/2.0/UDP p-cscf.cq.telecom.3gpp.net:6001;branch=z9hG4bK8\r\n\
            From: <sip:carol@cq.telecom.3gpp.net>;tag=1\r\n\
            To: <sip:bob@hebei.mobile.3gpp.net>;tag=2\r\n\
            Call-ID: x-1\r\nCSeq: 1 INVITE\r\n\r\n";
        routes()
            .dispatch(&mut ctx, Package::sip_response(resp, Peer::Logical("SCSCF".into())), &mut out)
            .unwrap();
        assert_eq!(single(out.drain_up()).peer, Peer::Logical("OTHER".into()));
    }
}
