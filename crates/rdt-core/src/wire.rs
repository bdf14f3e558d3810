//! # Wire format
//!
//! Each packet is a textual JSON object. Payload bytes are base64-encoded;
//! every other field is a literal number, boolean, or (for acks) the
//! sentinel string `"eof"`.
//!
//! Canonicalization: `serde_json` serializes struct fields in declaration
//! order, so as long as a packet's Rust fields are declared in the same
//! order used here, two implementations agreeing on this module produce
//! byte-identical output for the same logical packet. No manual field
//! reordering is performed.
//!
//! The checksum is a CRC-32 over the packet with its `checksum` field
//! nulled out. [`DataPacket::new`] and [`AckPacket::new`] encapsulate the
//! null-then-hash dance so callers never construct a checksummed packet
//! by hand.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum encoded datagram size. Sized to hold a base64-encoded
/// [`DEFAULT_FRAGMENT_SIZE`]-byte payload plus bookkeeping fields with
/// headroom for larger configured fragment sizes.
pub const MAX_DATAGRAM_SIZE: usize = 4096;

/// Default payload fragment size in bytes (`D`).
pub const DEFAULT_FRAGMENT_SIZE: usize = 1000;

/// Fixed retransmit timeout.
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_millis(600);

/// Default fast-retransmit duplicate-ack threshold (`K`).
pub const DEFAULT_FAST_RETRANSMIT_THRESHOLD: u32 = 2;

/// Number of consecutive empty-outstanding-map ticks before a sender gives up.
pub const IDLE_TICK_LIMIT: u32 = 3;

/// `TimeoutMonitor` poll cadence.
pub const TIMEOUT_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(200);

/// How many times the receiver repeats the end-of-stream ack.
pub const EOF_ACK_REPEAT: usize = 10;

// ─── DataPacket ─────────────────────────────────────────────────────────────

/// A single fragment of the byte stream, or the terminal end-of-stream
/// marker (empty payload, `end_of_file = true`).
///
/// Field order matches the wire's canonical field order; do not reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPacket {
    pub sequence_number: u64,
    #[serde(with = "payload_base64")]
    pub data: Vec<u8>,
    pub end_of_file: bool,
    pub checksum: Option<u32>,
}

impl DataPacket {
    /// Build a data packet with checksum computed over the rest of the fields.
    pub fn new(sequence_number: u64, data: Vec<u8>, end_of_file: bool) -> Self {
        let mut pkt = DataPacket {
            sequence_number,
            data,
            end_of_file,
            checksum: None,
        };
        pkt.checksum = Some(pkt.compute_checksum());
        pkt
    }

    /// CRC-32 over this packet with `checksum` nulled.
    pub fn compute_checksum(&self) -> u32 {
        let shadow = DataPacket {
            sequence_number: self.sequence_number,
            data: self.data.clone(),
            end_of_file: self.end_of_file,
            checksum: None,
        };
        checksum_of(&shadow)
    }

    /// Re-derive the checksum and compare against the stored one.
    /// A packet with no checksum field fails verification, mirroring the
    /// reference behavior of treating a missing checksum as invalid.
    pub fn verify_checksum(&self) -> bool {
        match self.checksum {
            Some(c) => c == self.compute_checksum(),
            None => false,
        }
    }
}

mod payload_base64 {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        STANDARD.decode(s.as_bytes()).map_err(de::Error::custom)
    }
}

// ─── AckTarget ──────────────────────────────────────────────────────────────

/// The acknowledged-packet field of an ack: either the highest contiguous
/// sequence number received so far, or the end-of-stream sentinel.
///
/// Mixed-type on the wire (`u64` or the literal string `"eof"`), so this
/// is a hand-written `Serialize`/`Deserialize` pair rather than a derive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckTarget {
    Sequence(u64),
    EndOfStream,
}

const EOF_TOKEN: &str = "eof";

impl Serialize for AckTarget {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            AckTarget::Sequence(n) => s.serialize_u64(*n),
            AckTarget::EndOfStream => s.serialize_str(EOF_TOKEN),
        }
    }
}

impl<'de> Deserialize<'de> for AckTarget {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct AckTargetVisitor;

        impl<'de> Visitor<'de> for AckTargetVisitor {
            type Value = AckTarget;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or the string \"eof\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<AckTarget, E> {
                Ok(AckTarget::Sequence(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<AckTarget, E> {
                u64::try_from(v)
                    .map(AckTarget::Sequence)
                    .map_err(|_| de::Error::custom("negative sequence number"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<AckTarget, E> {
                if v == EOF_TOKEN {
                    Ok(AckTarget::EndOfStream)
                } else {
                    Err(de::Error::custom(format!("unrecognized ack token: {v}")))
                }
            }
        }

        d.deserialize_any(AckTargetVisitor)
    }
}

// ─── AckPacket ──────────────────────────────────────────────────────────────

/// An acknowledgement datagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckPacket {
    pub acknowledged: AckTarget,
    pub checksum: Option<u32>,
}

impl AckPacket {
    pub fn new(acknowledged: AckTarget) -> Self {
        let mut pkt = AckPacket {
            acknowledged,
            checksum: None,
        };
        pkt.checksum = Some(pkt.compute_checksum());
        pkt
    }

    pub fn compute_checksum(&self) -> u32 {
        let shadow = AckPacket {
            acknowledged: self.acknowledged,
            checksum: None,
        };
        checksum_of(&shadow)
    }

    pub fn verify_checksum(&self) -> bool {
        match self.checksum {
            Some(c) => c == self.compute_checksum(),
            None => false,
        }
    }
}

fn checksum_of<T: Serialize>(value: &T) -> u32 {
    let bytes = serde_json::to_vec(value).expect("packet shadow record is always serializable");
    crc32fast::hash(&bytes)
}
