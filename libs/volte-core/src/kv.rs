//! The `key=value` sub-format carried inside EPC payloads.
//!
//! Lines are CRLF separated, the first `=` splits key from value, and
//! malformed lines (no `=`) are dropped silently. There is no escaping:
//! the round-trip property `unmarshal(marshal(m)) == m` holds for maps
//! whose keys and values are non-empty and `=`/CRLF-free.

use std::collections::HashMap;

/// Field names used across the EPC exchanges.
pub mod field {
    pub const IMSI: &str = "IMSI";
    pub const USER_NAME: &str = "UserName";
    pub const RAND: &str = "RAND";
    pub const AUTN: &str = "AUTN";
    pub const XRES: &str = "XRES";
    pub const RES: &str = "RES";
    pub const CK: &str = "CK";
    pub const IK: &str = "IK";
    pub const APN: &str = "APN";
    pub const IP: &str = "IP";
    pub const SCSCF: &str = "SCSCF";
    pub const CELL_ID: &str = "UTRAN-CELL-ID-3GPP";
}

/// Serialize a map as CRLF-joined `key=value` lines. An empty map
/// serializes to the empty string.
pub fn marshal(m: &HashMap<String, String>) -> String {
    let mut keys: Vec<&String> = m.keys().collect();
    // Stable output makes frames reproducible across runs.
    keys.sort();
    let lines: Vec<String> = keys.iter().map(|k| format!("{}={}", k, m[*k])).collect();
    lines.join("\r\n")
}

/// Parse CRLF-separated `key=value` lines. The input is trimmed first so
/// trailing padding from fixed-size buffers does not produce a bogus line.
pub fn unmarshal(data: &[u8]) -> HashMap<String, String> {
    let mut m = HashMap::new();
    let text = String::from_utf8_lossy(data);
    for line in text.trim().split("\r\n") {
        if let Some((k, v)) = line.split_once('=') {
            m.insert(k.to_string(), v.to_string());
        }
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn round_trip() {
        let m = map(&[("IMSI", "460001234567890"), ("APN", "ims"), ("IP", "10.0.0.2")]);
        assert_eq!(unmarshal(marshal(&m).as_bytes()), m);
    }

    #[test]
    fn empty_map_is_empty_string() {
        assert_eq!(marshal(&HashMap::new()), "");
    }

    #[test]
    fn malformed_lines_dropped() {
        let m = unmarshal(b"IMSI=460001\r\nnot a pair\r\nAPN=ims");
        assert_eq!(m.len(), 2);
        assert_eq!(m["IMSI"], "460001");
        assert_eq!(m["APN"], "ims");
    }

    #[test]
    fn first_equals_splits() {
        let m = unmarshal(b"nonce=aGVsbG8=");
        assert_eq!(m["nonce"], "aGVsbG8=");
    }

    #[test]
    fn surrounding_whitespace_trimmed() {
        let m = unmarshal(b"\r\nIMSI=1\r\n\r\n");
        assert_eq!(m.len(), 1);
    }
}
