//! SIP parsing errors.

use thiserror::Error;

/// Errors produced while parsing a SIP message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The first line is neither a valid request line nor a status line.
    #[error("invalid SIP start line: {0:?}")]
    InvalidStartLine(String),

    /// A status line carried a non-numeric status code.
    #[error("invalid status code: {0:?}")]
    InvalidStatusCode(String),

    /// A SIP URI did not match `sip:user@domain`.
    #[error("invalid SIP URI: {0:?}")]
    InvalidUri(String),

    /// The message had no content at all.
    #[error("empty message")]
    Empty,
}
