//! Error taxonomy of the signaling engine.
//!
//! Framing errors stay at the codec, correlation and authentication errors
//! surface to the SIP peer as terminal responses, transport errors are
//! logged and the message dropped. A handler returning an error never
//! terminates the entity loop.

use thiserror::Error;

/// Inbound datagram could not be decoded. Logged and dropped, never
/// propagated to a peer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("truncated EPC frame: need {need} bytes, have {have}")]
    TruncatedFrame { need: usize, have: usize },

    #[error("invalid SIP start line: {0:?}")]
    InvalidStartLine(String),

    #[error("SIP payload is not valid UTF-8")]
    InvalidUtf8,
}

/// Session cache correlation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// `set_expected` was called for a key with no live pending session.
    #[error("no pending request for {0:?}")]
    NotFoundRequest(String),
}

/// Configuration loading/resolution failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("no routing-table entry for logical peer {0:?}")]
    UnknownPeer(String),
}

/// Transport send/receive failures, including the synchronous
/// request/response primitive's deadline.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("no reply within the {0:?} deadline")]
    DeadlineExceeded(std::time::Duration),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors returned by entity handlers to the dispatch loop.
#[derive(Error, Debug)]
pub enum EntityError {
    #[error("authentication failed for {0:?}")]
    AuthenFailed(String),

    #[error("registration request expired for {0:?}")]
    RequestExpired(String),

    #[error("callee not registered: {0:?}")]
    CalleeNotExist(String),

    #[error("address pool exhausted")]
    NotEnoughIp,

    #[error("unknown subscriber {0:?}")]
    UnknownSubscriber(String),

    #[error("bad key material: {0}")]
    BadKeyMaterial(String),

    #[error("handler panicked: {0}")]
    HandlerPanic(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Sip(#[from] volte_sip::ParseError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
