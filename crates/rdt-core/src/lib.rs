//! # rdt-core
//!
//! Reliable datagram stream transport: fragmentation, cumulative-ack
//! tracking, fast-retransmit, timeout-driven retransmit, and the
//! receiver-side reassembly state machine.
//!
//! Unidirectional, ordered, loss-tolerant byte-stream delivery over an
//! unreliable datagram substrate (UDP). No congestion control, no
//! multiplexing, no confidentiality.
//!
//! ## Crate structure
//!
//! - [`wire`] — packet types, checksum, base64/JSON codec
//! - [`config`] — sender/receiver tuning parameters
//! - [`error`] — error taxonomy
//! - [`tracker`] — sender-side outstanding/archive/HCA bookkeeping
//! - [`reassembly`] — receiver-side HCP/out-of-order bookkeeping
//! - [`stats`] — sender/receiver counters

pub mod config;
pub mod error;
pub mod reassembly;
pub mod stats;
pub mod tracker;
pub mod wire;

pub use config::{ReceiverConfig, SenderConfig};
pub use error::TransportError;
pub use wire::{AckPacket, AckTarget, DataPacket};
