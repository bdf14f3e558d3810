//! Error taxonomy.
//!
//! Most of the conditions this protocol encounters (checksum failure,
//! stale/duplicate ack, packet loss, corrupted input) are not errors in
//! this sense — they are routine protocol events absorbed by the state
//! machines and only ever surfaced as log events by the binaries that call
//! into this crate. `TransportError` covers the small remainder:
//! conditions that must propagate out of a binary as a failure.
//!
//! An archive miss on fast-retransmit (the archive has no packet for a
//! sequence number the tracker believes is outstanding) is not part of
//! this enum: per the invariants, it cannot occur, so callers treat it as
//! a programming-error assertion (`debug_assert!`) at the call site rather
//! than a recoverable `Result`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("socket I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid peer address {addr:?}: {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
}
