//! Digest challenge/response header helpers.
//!
//! The registrar exchanges `WWW-Authenticate` challenges and `Authorization`
//! answers in the loose `Digest k=v, k=v` form the simulated devices emit;
//! values are not quoted and `=` may also appear inside base64 values, so
//! only the first `=` of each item splits.

use std::collections::HashMap;

/// Parse the parameter list of a `Digest` credential header.
///
/// Unknown parameters are kept; items without `=` are dropped.
pub fn parse_digest(header: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let rest = header.trim().strip_prefix("Digest").unwrap_or(header).trim();
    for item in rest.split(',') {
        if let Some((k, v)) = item.trim().split_once('=') {
            params.insert(k.trim().to_string(), v.trim().trim_matches('"').to_string());
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_challenge_response() {
        let p = parse_digest("Digest username=alice@h.net, response=q1w2e3, nc=00000001");
        assert_eq!(p.get("username").unwrap(), "alice@h.net");
        assert_eq!(p.get("response").unwrap(), "q1w2e3");
        assert_eq!(p.get("nc").unwrap(), "00000001");
    }

    #[test]
    fn base64_padding_survives() {
        let p = parse_digest("Digest response=qrs/tuv==, algorithm=AKAv1-MD5");
        assert_eq!(p.get("response").unwrap(), "qrs/tuv==");
    }

    #[test]
    fn items_without_equals_dropped() {
        let p = parse_digest("Digest username=u, integrity protection:no");
        assert_eq!(p.len(), 1);
    }
}
