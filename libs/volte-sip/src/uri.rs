//! SIP URI handling.

use crate::error::ParseError;
use std::fmt;

/// A SIP URI of the shape `sip:user@domain`.
///
/// The simulator only routes on the user part and the home-network domain,
/// so URI parameters and ports are kept inside `domain` verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Uri {
    pub username: String,
    pub domain: String,
}

impl Uri {
    pub fn new(username: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            domain: domain.into(),
        }
    }

    /// Parse `sip:user@domain`. The `sip:` scheme prefix is optional on
    /// input because some peers send bare `user@domain` in `From`.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let s = s.trim();
        let rest = s.strip_prefix("sip:").unwrap_or(s);
        match rest.split_once('@') {
            Some((user, domain)) if !user.is_empty() && !domain.is_empty() => Ok(Self {
                username: user.to_string(),
                domain: domain.to_string(),
            }),
            // A domain-only URI (e.g. the REGISTER request target).
            None if !rest.is_empty() => Ok(Self {
                username: String::new(),
                domain: rest.to_string(),
            }),
            _ => Err(ParseError::InvalidUri(s.to_string())),
        }
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.username.is_empty() {
            write!(f, "sip:{}", self.domain)
        } else {
            write!(f, "sip:{}@{}", self.username, self.domain)
        }
    }
}
