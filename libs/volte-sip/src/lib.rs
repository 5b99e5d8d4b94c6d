//! Minimal SIP message model for the VoLTE signaling simulator.
//!
//! This is deliberately not a general-purpose SIP stack. It models exactly
//! the subset of the grammar that the CSCF entities read and write:
//! - start lines for REGISTER/INVITE/PRACK/UPDATE requests and responses
//! - `Via`, `From`, `To`, `Call-ID`, `CSeq`, `Max-Forwards`, `Contact`
//! - `Authorization` / `WWW-Authenticate` (digest AKAv1-MD5 challenge)
//! - `P-Access-Network-Info` (current radio attachment point)
//!
//! Everything else is carried through opaquely so a proxied message survives
//! a hop without losing headers it does not understand.

pub mod auth;
pub mod error;
pub mod message;
pub mod uri;

#[cfg(test)]
mod property_tests;

pub use auth::parse_digest;
pub use error::ParseError;
pub use message::{via_branch, Message, Method, NameAddr, RequestLine, StartLine, StatusLine};
pub use uri::Uri;

/// Response status codes used by the signaling core.
pub mod status {
    pub const TRYING: u16 = 100;
    pub const OK: u16 = 200;
    pub const UNAUTHORIZED: u16 = 401;
    pub const TEMPORARILY_UNAVAILABLE: u16 = 480;
    pub const REQUEST_TERMINATED: u16 = 487;
    pub const SERVER_INTERNAL_ERROR: u16 = 500;
    pub const SERVER_TIMEOUT: u16 = 504;
    pub const GONE: u16 = 410;
    pub const DECLINE: u16 = 603;
}

/// Reason phrase for the subset of status codes this core emits.
pub fn reason_phrase(code: u16) -> &'static str {
    match code {
        status::TRYING => "Trying",
        status::OK => "OK",
        status::UNAUTHORIZED => "Unauthorized",
        status::GONE => "Gone",
        status::TEMPORARILY_UNAVAILABLE => "Temporarily Unavailable",
        status::REQUEST_TERMINATED => "Request Terminated",
        status::SERVER_INTERNAL_ERROR => "Server Internal Error",
        status::SERVER_TIMEOUT => "Server Time-out",
        status::DECLINE => "Decline",
        _ => "Unknown",
    }
}
