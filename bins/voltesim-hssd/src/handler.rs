//! EPC handlers of the HSS.

use crate::context::HssContext;
use std::collections::HashMap;
use volte_core::kv::field;
use volte_core::package::epc_method;
use volte_core::{EntityError, Outbox, Package, Peer, Route, Router};
use volte_crypt::aka;

/// Dispatch table of the HSS daemon.
pub fn routes() -> Router<HssContext> {
    let mut r = Router::new();
    r.register(
        Route::epc(epc_method::AUTHENTICATION_INFORMAT_REQUEST),
        authentication_information,
    );
    r.register(Route::epc(epc_method::UPDATE_LOCATION_REQUEST), update_location);
    r.register(
        Route::epc(epc_method::MULTIMEDIA_AUTHENTICATION_REQUEST),
        multimedia_authentication,
    );
    r.register(Route::epc(epc_method::USER_AUTHORIZATION_REQUEST), user_authorization);
    r.seal();
    r
}

/// Derive a fresh vector and lay it out as answer fields. The subscriber
/// key field (`IMSI` for EPS, `UserName` for IMS) is echoed back so the
/// asker can correlate without transaction ids.
fn vector_fields(
    key_field: &str,
    key_value: &str,
    root_key: &str,
    opc: &str,
) -> Result<HashMap<String, String>, EntityError> {
    let v = aka::generate(root_key, opc).map_err(|e| EntityError::BadKeyMaterial(e.to_string()))?;
    let mut m = HashMap::new();
    m.insert(key_field.to_string(), key_value.to_string());
    m.insert(field::RAND.to_string(), hex::encode(v.rand));
    m.insert(field::AUTN.to_string(), hex::encode(&v.autn));
    m.insert(field::XRES.to_string(), hex::encode(&v.xres));
    m.insert(field::CK.to_string(), hex::encode(&v.ck));
    m.insert(field::IK.to_string(), hex::encode(&v.ik));
    Ok(m)
}

/// AIR: the MME asks for an EPS authentication vector by IMSI.
fn authentication_information(
    ctx: &mut HssContext,
    pkg: Package,
    out: &mut Outbox,
) -> Result<(), EntityError> {
    let kvs = pkg.kv_payload();
    let imsi = kvs.get(field::IMSI).cloned().unwrap_or_default();
    let sub = ctx
        .store
        .by_imsi(&imsi)
        .ok_or_else(|| EntityError::UnknownSubscriber(imsi.clone()))?;
    let fields = vector_fields(field::IMSI, &imsi, &sub.root_key, &sub.opc)?;
    log::info!("[HSS] authentication vector issued for IMSI {imsi}");
    out.push_down(Package::epc_kv(
        epc_method::AUTHENTICATION_INFORMAT_RESPONSE,
        &fields,
        Peer::Logical("MME".into()),
    ));
    Ok(())
}

/// ULR: the MME registers the subscriber's location; the answer carries
/// the provisioned APN the bearer must be created on.
fn update_location(ctx: &mut HssContext, pkg: Package, out: &mut Outbox) -> Result<(), EntityError> {
    let kvs = pkg.kv_payload();
    let imsi = kvs.get(field::IMSI).cloned().unwrap_or_default();
    let sub = ctx
        .store
        .by_imsi(&imsi)
        .ok_or_else(|| EntityError::UnknownSubscriber(imsi.clone()))?;
    let mut fields = HashMap::new();
    fields.insert(field::IMSI.to_string(), imsi.clone());
    fields.insert(field::APN.to_string(), sub.apn.clone());
    log::info!("[HSS] location updated for IMSI {imsi}, apn {}", sub.apn);
    out.push_down(Package::epc_kv(
        epc_method::UPDATE_LOCATION_ACK,
        &fields,
        Peer::Logical("MME".into()),
    ));
    Ok(())
}

/// MAR: the S-CSCF asks for an IMS authentication vector by username.
fn multimedia_authentication(
    ctx: &mut HssContext,
    pkg: Package,
    out: &mut Outbox,
) -> Result<(), EntityError> {
    let kvs = pkg.kv_payload();
    let user = kvs.get(field::USER_NAME).cloned().unwrap_or_default();
    let sub = ctx
        .store
        .by_username(&user)
        .ok_or_else(|| EntityError::UnknownSubscriber(user.clone()))?;
    let fields = vector_fields(field::USER_NAME, &user, &sub.root_key, &sub.opc)?;
    log::info!("[HSS] multimedia authentication vector issued for {user}");
    out.push_down(Package::epc_kv(
        epc_method::MULTIMEDIA_AUTHENTICATION_ANSWER,
        &fields,
        Peer::Logical("SCSCF".into()),
    ));
    Ok(())
}

/// UAR: the I-CSCF asks which S-CSCF serves a registering user. This is
/// the one synchronous exchange in the system, so the answer goes back to
/// the asking socket rather than through the routing table.
fn user_authorization(ctx: &mut HssContext, pkg: Package, out: &mut Outbox) -> Result<(), EntityError> {
    let kvs = pkg.kv_payload();
    let user = kvs.get(field::USER_NAME).cloned().unwrap_or_default();
    if ctx.store.by_username(&user).is_none() {
        return Err(EntityError::UnknownSubscriber(user));
    }
    let scscf = ctx.points.resolve("SCSCF")?;
    let mut fields = HashMap::new();
    fields.insert(field::USER_NAME.to_string(), user.clone());
    fields.insert(field::SCSCF.to_string(), scscf.to_string());
    let peer = match pkg.source {
        Some(src) => Peer::Socket(src),
        None => Peer::Logical("ICSCF".into()),
    };
    log::info!("[HSS] user {user} authorized, serving cscf {scscf}");
    out.push_down(Package::epc_kv(epc_method::USER_AUTHORIZATION_ANSWER, &fields, peer));
    Ok(())
}
