//! EPC handlers of the MME attach state machine.

use crate::context::{AttachState, MmeContext};
use std::collections::HashMap;
use volte_core::kv::field;
use volte_core::package::epc_method;
use volte_core::{EntityError, Outbox, Package, Peer, Route, Router};

/// Dispatch table of the MME daemon.
pub fn routes() -> Router<MmeContext> {
    let mut r = Router::new();
    r.register(Route::epc(epc_method::ATTACH_REQUEST), attach_request);
    r.register(
        Route::epc(epc_method::AUTHENTICATION_INFORMAT_RESPONSE),
        authentication_information_answer,
    );
    r.register(Route::epc(epc_method::AUTHENTICATION_RESPONSE), authentication_response);
    r.register(Route::epc(epc_method::UPDATE_LOCATION_ACK), update_location_ack);
    r.register(Route::epc(epc_method::CREATE_SESSION_RESPONSE), create_session_response);
    r.seal();
    r
}

/// Destination for device-bound messages: the access node the attach came
/// through, falling back to the routing table before the first exchange.
fn access_peer(state: &AttachState) -> Peer {
    match state.enb_addr {
        Some(addr) => Peer::Socket(addr),
        None => Peer::Logical("ENB".into()),
    }
}

/// AttachRequest from the access side: open an attach session and ask the
/// HSS for an authentication vector.
fn attach_request(ctx: &mut MmeContext, pkg: Package, out: &mut Outbox) -> Result<(), EntityError> {
    let kvs = pkg.kv_payload();
    let imsi = kvs.get(field::IMSI).cloned().unwrap_or_default();
    let cell_id = kvs.get(field::CELL_ID).cloned().unwrap_or_default();
    log::info!("[MME] attach request from IMSI {imsi} via cell {cell_id}");

    ctx.sessions.put_pending(
        &imsi,
        AttachState { cell_id, enb_addr: pkg.source, challenge: HashMap::new() },
    );

    let mut fields = HashMap::new();
    fields.insert(field::IMSI.to_string(), imsi);
    out.push_up(Package::epc_kv(
        epc_method::AUTHENTICATION_INFORMAT_REQUEST,
        &fields,
        Peer::Logical("HSS".into()),
    ));
    Ok(())
}

/// AIA from the HSS: remember the expected RES, then challenge the device.
/// XRES never travels toward the access side.
fn authentication_information_answer(
    ctx: &mut MmeContext,
    pkg: Package,
    out: &mut Outbox,
) -> Result<(), EntityError> {
    let mut kvs = pkg.kv_payload();
    let imsi = kvs.get(field::IMSI).cloned().unwrap_or_default();
    let xres = kvs
        .remove(field::XRES)
        .ok_or_else(|| EntityError::BadKeyMaterial(format!("vector for {imsi} lacks XRES")))?;

    let mut state = ctx
        .sessions
        .get_pending(&imsi)
        .ok_or_else(|| EntityError::RequestExpired(imsi.clone()))?;
    state.challenge = kvs.clone();
    let peer = access_peer(&state);
    ctx.sessions.put_pending(&imsi, state);
    ctx.sessions.set_expected(&imsi, xres.to_lowercase())?;

    out.push_down(Package::epc_kv(epc_method::AUTHENTICATION_REQUEST, &kvs, peer));
    Ok(())
}

/// AuthenticationResponse from the device: compare RES with the cached
/// XRES. A mismatch re-challenges with the retained vector and surfaces
/// an error; a match moves on to the location update.
fn authentication_response(
    ctx: &mut MmeContext,
    pkg: Package,
    out: &mut Outbox,
) -> Result<(), EntityError> {
    let kvs = pkg.kv_payload();
    let imsi = kvs.get(field::IMSI).cloned().unwrap_or_default();
    let res = kvs.get(field::RES).cloned().unwrap_or_default();

    let expected = match ctx.sessions.get_expected(&imsi) {
        Some(Some(xres)) => xres,
        // No vector yet, or the whole session lapsed: nothing to verify
        // against, the device has to attach again.
        Some(None) | None => return Err(EntityError::RequestExpired(imsi)),
    };

    if res.to_lowercase() != expected {
        log::warn!("[MME] RES mismatch for IMSI {imsi}, re-challenging");
        if let Some(state) = ctx.sessions.get_pending(&imsi) {
            out.push_down(Package::epc_kv(
                epc_method::AUTHENTICATION_REQUEST,
                &state.challenge,
                access_peer(&state),
            ));
        }
        return Err(EntityError::AuthenFailed(imsi));
    }

    log::info!("[MME] IMSI {imsi} authenticated");
    let mut fields = HashMap::new();
    fields.insert(field::IMSI.to_string(), imsi);
    out.push_up(Package::epc_kv(
        epc_method::UPDATE_LOCATION_REQUEST,
        &fields,
        Peer::Logical("HSS".into()),
    ));
    Ok(())
}

/// ULA from the HSS: accept the attach toward the device and hand the
/// bearer over to the PGW, tagged with the cell the device sits behind.
fn update_location_ack(ctx: &mut MmeContext, pkg: Package, out: &mut Outbox) -> Result<(), EntityError> {
    let kvs = pkg.kv_payload();
    let imsi = kvs.get(field::IMSI).cloned().unwrap_or_default();
    let apn = kvs.get(field::APN).cloned().unwrap_or_default();

    let state = ctx
        .sessions
        .get_pending(&imsi)
        .ok_or_else(|| EntityError::RequestExpired(imsi.clone()))?;

    let mut accept = HashMap::new();
    accept.insert(field::IMSI.to_string(), imsi.clone());
    accept.insert(field::APN.to_string(), apn.clone());
    out.push_down(Package::epc_kv(epc_method::ATTACH_ACCEPT, &accept, access_peer(&state)));

    let mut session = HashMap::new();
    session.insert(field::IMSI.to_string(), imsi.clone());
    session.insert(field::APN.to_string(), apn);
    session.insert(field::CELL_ID.to_string(), state.cell_id.clone());
    out.push_up(Package::epc_kv(
        epc_method::CREATE_SESSION_REQUEST,
        &session,
        Peer::Logical("PGW".into()),
    ));
    log::info!("[MME] attach accepted for IMSI {imsi}, session requested at PGW");
    Ok(())
}

/// CreateSessionResponse from the PGW closes the attach.
fn create_session_response(
    ctx: &mut MmeContext,
    pkg: Package,
    _out: &mut Outbox,
) -> Result<(), EntityError> {
    let kvs = pkg.kv_payload();
    let imsi = kvs.get(field::IMSI).cloned().unwrap_or_default();
    let ip = kvs.get(field::IP).cloned().unwrap_or_default();
    ctx.sessions.delete_pending(&imsi);
    log::info!("[MME] bearer ready for IMSI {imsi}: {ip}");
    Ok(())
}
