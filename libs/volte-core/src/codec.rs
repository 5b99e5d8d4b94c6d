//! Wire codec: raw datagram bytes to [`Package`] and back.
//!
//! The two signaling domains share one socket, distinguished by a
//! first-byte sniff:
//!
//! - an all-`0x0F` 4-byte prefix is a heartbeat; the remainder of the
//!   datagram is the sender's access-point identifier
//! - `0x01` opens a binary EPC frame:
//!   `protocolID(1) | methodID(1) | size(2 BE) | payload(size)`
//! - anything else is SIP text, classified request/response from the
//!   start line.

use crate::error::CodecError;
use crate::package::{
    Body, Package, Peer, EPC_PROTOCOL, HEARTBEAT_PREFIX_LEN, HEARTBEAT_TAG,
};
use bytes::{BufMut, Bytes, BytesMut};
use std::net::SocketAddr;

/// EPC frame header length: protocol, method, 16-bit size.
pub const EPC_HEADER_LEN: usize = 4;

/// Serialize a package for the wire.
pub fn encode(pkg: &Package) -> Bytes {
    match &pkg.body {
        Body::Epc { method, payload } => {
            let mut buf = BytesMut::with_capacity(EPC_HEADER_LEN + payload.len());
            buf.put_u8(EPC_PROTOCOL);
            buf.put_u8(*method);
            // Size always reflects the actual payload; zero is legal.
            buf.put_u16(payload.len() as u16);
            buf.put_slice(payload);
            buf.freeze()
        }
        Body::Sip { text, .. } => Bytes::copy_from_slice(text.as_bytes()),
        Body::Heartbeat { access_point } => {
            let mut buf = BytesMut::with_capacity(HEARTBEAT_PREFIX_LEN + access_point.len());
            buf.put_bytes(HEARTBEAT_TAG, HEARTBEAT_PREFIX_LEN);
            buf.put_slice(access_point.as_bytes());
            buf.freeze()
        }
    }
}

/// Decode a datagram received from `source`. The resulting package's peer
/// is the source address so a handler can reply in place.
pub fn decode(data: &[u8], source: SocketAddr) -> Result<Package, CodecError> {
    let body = decode_body(data)?;
    Ok(Package {
        body,
        peer: Peer::Socket(source),
        source: Some(source),
    })
}

fn decode_body(data: &[u8]) -> Result<Body, CodecError> {
    if data.len() >= HEARTBEAT_PREFIX_LEN
        && data[..HEARTBEAT_PREFIX_LEN].iter().all(|&b| b == HEARTBEAT_TAG)
    {
        return Ok(Body::Heartbeat {
            access_point: String::from_utf8_lossy(&data[HEARTBEAT_PREFIX_LEN..]).into_owned(),
        });
    }

    if data.first() == Some(&EPC_PROTOCOL) {
        if data.len() < EPC_HEADER_LEN {
            return Err(CodecError::TruncatedFrame { need: EPC_HEADER_LEN, have: data.len() });
        }
        let size = u16::from_be_bytes([data[2], data[3]]) as usize;
        let need = EPC_HEADER_LEN + size;
        if data.len() < need {
            return Err(CodecError::TruncatedFrame { need, have: data.len() });
        }
        return Ok(Body::Epc {
            method: data[1],
            payload: Bytes::copy_from_slice(&data[EPC_HEADER_LEN..need]),
        });
    }

    let text = std::str::from_utf8(data).map_err(|_| CodecError::InvalidUtf8)?;
    Ok(Body::Sip {
        request: classify_sip(text)?,
        text: text.to_string(),
    })
}

/// Classify a SIP frame from its start line: the third whitespace token
/// starting with `SIP` marks a request, the first token starting with
/// `SIP` marks a response.
fn classify_sip(text: &str) -> Result<bool, CodecError> {
    let start_line = text.split("\r\n").next().unwrap_or("");
    let tokens: Vec<&str> = start_line.split_whitespace().collect();
    if tokens.first().is_some_and(|t| t.starts_with("SIP")) {
        Ok(false)
    } else if tokens.len() >= 3 && tokens[2].starts_with("SIP") {
        Ok(true)
    } else {
        Err(CodecError::InvalidStartLine(start_line.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::epc_method;

    fn src() -> SocketAddr {
        "10.0.0.9:5060".parse().unwrap()
    }

    #[test]
    fn epc_frame_round_trip() {
        let pkg = Package::epc(
            epc_method::ATTACH_REQUEST,
            &b"IMSI=460001234567890"[..],
            Peer::Logical("MME".into()),
        );
        let wire = encode(&pkg);
        assert_eq!(wire[0], EPC_PROTOCOL);
        assert_eq!(wire[1], epc_method::ATTACH_REQUEST);

        let decoded = decode(&wire, src()).unwrap();
        assert_eq!(decoded.body, pkg.body);
        assert_eq!(decoded.source, Some(src()));
    }

    #[test]
    fn zero_length_payload_is_legal() {
        let pkg = Package::epc(epc_method::ATTACH_ACCEPT, Bytes::new(), Peer::Socket(src()));
        let wire = encode(&pkg);
        assert_eq!(wire.len(), EPC_HEADER_LEN);
        let decoded = decode(&wire, src()).unwrap();
        assert_eq!(decoded.body, pkg.body);
    }

    #[test]
    fn truncated_frame_rejected() {
        // Declares 10 payload bytes, carries 2.
        let wire = [EPC_PROTOCOL, 0x00, 0x00, 0x0A, 0xAA, 0xBB];
        assert!(matches!(
            decode(&wire, src()),
            Err(CodecError::TruncatedFrame { need: 14, have: 6 })
        ));
    }

    #[test]
    fn sip_request_classified() {
        let decoded = decode(b"REGISTER sip:x SIP/2.0\r\n\r\n", src()).unwrap();
        assert!(matches!(decoded.body, Body::Sip { request: true, .. }));
    }

    #[test]
    fn sip_response_classified() {
        let decoded = decode(b"SIP/2.0 200 OK\r\n\r\n", src()).unwrap();
        assert!(matches!(decoded.body, Body::Sip { request: false, .. }));
    }

    #[test]
    fn garbage_start_line_rejected() {
        assert!(matches!(
            decode(b"hello world", src()),
            Err(CodecError::InvalidStartLine(_))
        ));
    }

    #[test]
    fn heartbeat_bypasses_framing() {
        let wire = [&[HEARTBEAT_TAG; 4][..], b"CELL0001"].concat();
        let decoded = decode(&wire, src()).unwrap();
        assert_eq!(
            decoded.body,
            Body::Heartbeat { access_point: "CELL0001".into() }
        );
    }

    #[test]
    fn heartbeat_encodes_with_prefix() {
        let pkg = Package::heartbeat("CELL0002", Peer::Logical("PGW".into()));
        let wire = encode(&pkg);
        assert_eq!(&wire[..4], &[HEARTBEAT_TAG; 4]);
        assert_eq!(&wire[4..], b"CELL0002");
    }
}
