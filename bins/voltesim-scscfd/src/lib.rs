//! S-CSCF: registrar, authenticator, and session router.
//!
//! Registration is a two-pass digest-AKA handshake. The first REGISTER
//! opens a pending session and asks the HSS for a vector (MAR); the MAA
//! answer turns into a 401 challenge whose nonce carries RAND and AUTN.
//! The second REGISTER proves possession of the root key by echoing RES;
//! a match registers the user, a mismatch ends the attempt with a
//! terminal 401. A vector answer arriving after the session TTL tells
//! the device to start over with 410 Gone.
//!
//! Registered users get INVITE/PRACK/UPDATE routing: same-domain callees
//! are reached down through the access edge via their recorded attachment
//! point, other domains through the peer network's serving CSCF.

pub mod context;
pub mod handler;

pub use context::ScscfContext;
pub use handler::routes;
