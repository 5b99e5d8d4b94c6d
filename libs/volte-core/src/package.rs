//! The dual-format message envelope.
//!
//! A [`Package`] is one unit of signaling in flight. The body is an
//! explicit tagged variant: a binary EPC frame, a SIP text frame, or a
//! heartbeat. The dispatch key ([`Route`]) is always computed from the
//! body, never stored alongside it.

use crate::kv;
use bytes::Bytes;
use std::collections::HashMap;
use std::net::SocketAddr;

/// Protocol tag of the binary circuit-domain protocol.
pub const EPC_PROTOCOL: u8 = 0x01;
/// Protocol tag of SIP text signaling.
pub const SIP_PROTOCOL: u8 = 0x00;
/// Every byte of a heartbeat prefix.
pub const HEARTBEAT_TAG: u8 = 0x0F;
/// Length of the all-0x0F heartbeat prefix.
pub const HEARTBEAT_PREFIX_LEN: usize = 4;

/// Method id of a SIP request within [`SIP_PROTOCOL`].
pub const SIP_REQUEST: u8 = 0x00;
/// Method id of a SIP response within [`SIP_PROTOCOL`].
pub const SIP_RESPONSE: u8 = 0x01;

/// EPC method ids.
pub mod epc_method {
    pub const ATTACH_REQUEST: u8 = 0x00;
    pub const AUTHENTICATION_INFORMAT_REQUEST: u8 = 0x01;
    pub const AUTHENTICATION_INFORMAT_RESPONSE: u8 = 0x02;
    pub const AUTHENTICATION_REQUEST: u8 = 0x03;
    pub const AUTHENTICATION_RESPONSE: u8 = 0x04;
    pub const UPDATE_LOCATION_REQUEST: u8 = 0x05;
    pub const UPDATE_LOCATION_ACK: u8 = 0x06;
    pub const CREATE_SESSION_REQUEST: u8 = 0x07;
    pub const CREATE_SESSION_RESPONSE: u8 = 0x08;
    pub const ATTACH_ACCEPT: u8 = 0x0A;
    pub const USER_AUTHORIZATION_REQUEST: u8 = 0x0B;
    pub const USER_AUTHORIZATION_ANSWER: u8 = 0x0C;
    pub const MULTIMEDIA_AUTHENTICATION_REQUEST: u8 = 0x0D;
    pub const MULTIMEDIA_AUTHENTICATION_ANSWER: u8 = 0x0E;
}

/// Dispatch key: (protocol id, method id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Route {
    pub protocol: u8,
    pub method: u8,
}

impl Route {
    pub const fn epc(method: u8) -> Self {
        Self { protocol: EPC_PROTOCOL, method }
    }

    pub const fn sip_request() -> Self {
        Self { protocol: SIP_PROTOCOL, method: SIP_REQUEST }
    }

    pub const fn sip_response() -> Self {
        Self { protocol: SIP_PROTOCOL, method: SIP_RESPONSE }
    }
}

/// Message body, tagged by signaling domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Binary circuit-domain frame.
    Epc { method: u8, payload: Bytes },
    /// SIP text; `request` mirrors the start-line classification.
    Sip { request: bool, text: String },
    /// Keep-alive carrying the sender's access-point identifier. Never
    /// routed; the entity loop consumes it before dispatch.
    Heartbeat { access_point: String },
}

/// Where a package is headed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Peer {
    /// Logical destination name, resolved against the routing table at
    /// send time ("HSS", "PCSCF", ...).
    Logical(String),
    /// Concrete transport address, used for reply-in-place.
    Socket(SocketAddr),
}

/// One unit of signaling in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub body: Body,
    pub peer: Peer,
    /// Source address the datagram arrived from; `None` for packages
    /// built locally.
    pub source: Option<SocketAddr>,
}

impl Package {
    pub fn epc(method: u8, payload: impl Into<Bytes>, peer: Peer) -> Self {
        Self {
            body: Body::Epc { method, payload: payload.into() },
            peer,
            source: None,
        }
    }

    /// Build an EPC package whose payload is a `key=value` map.
    pub fn epc_kv(method: u8, fields: &HashMap<String, String>, peer: Peer) -> Self {
        Self::epc(method, kv::marshal(fields).into_bytes(), peer)
    }

    pub fn sip_request(text: impl Into<String>, peer: Peer) -> Self {
        Self {
            body: Body::Sip { request: true, text: text.into() },
            peer,
            source: None,
        }
    }

    pub fn sip_response(text: impl Into<String>, peer: Peer) -> Self {
        Self {
            body: Body::Sip { request: false, text: text.into() },
            peer,
            source: None,
        }
    }

    pub fn heartbeat(access_point: impl Into<String>, peer: Peer) -> Self {
        Self {
            body: Body::Heartbeat { access_point: access_point.into() },
            peer,
            source: None,
        }
    }

    /// The dispatch key, computed from the body. Heartbeats map onto the
    /// reserved all-0x0F route, which no entity registers a handler for.
    pub fn route(&self) -> Route {
        match &self.body {
            Body::Epc { method, .. } => Route::epc(*method),
            Body::Sip { request: true, .. } => Route::sip_request(),
            Body::Sip { request: false, .. } => Route::sip_response(),
            Body::Heartbeat { .. } => Route { protocol: HEARTBEAT_TAG, method: HEARTBEAT_TAG },
        }
    }

    /// Decode the EPC payload's `key=value` lines. Empty for SIP bodies.
    pub fn kv_payload(&self) -> HashMap<String, String> {
        match &self.body {
            Body::Epc { payload, .. } => kv::unmarshal(payload),
            _ => HashMap::new(),
        }
    }

    /// SIP text of the body, if this is a SIP package.
    pub fn sip_text(&self) -> Option<&str> {
        match &self.body {
            Body::Sip { text, .. } => Some(text),
            _ => None,
        }
    }
}
