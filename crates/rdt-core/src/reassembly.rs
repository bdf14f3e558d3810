//! Receiver-side bookkeeping: highest cumulative packet (HCP), the
//! out-of-order set, and the ordered collection of accepted payloads.
//!
//! This module is pure logic — no sockets, no I/O — so the receiver
//! binary's network loop can be exercised end-to-end against a simulated
//! adversarial network in tests.

use std::collections::{BTreeMap, BTreeSet};

use crate::wire::DataPacket;

/// What the caller should do after feeding a datagram into
/// [`ReassemblyState::accept`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// Checksum verification failed; the datagram was silently dropped.
    ChecksumFailed,
    /// Duplicate or already-superseded sequence number; dropped without ack.
    Duplicate,
    /// The end-of-stream packet was recorded. No ack is sent for this
    /// event directly — the end-of-stream ack handshake fires once HCP
    /// catches up to `eof_target()`.
    EndOfStreamRecorded,
    /// A data packet was accepted (in-order or out-of-order); the caller
    /// should emit an ack for the current HCP.
    Accepted { ack_hcp: u64 },
}

#[derive(Default)]
pub struct ReassemblyState {
    hcp: u64,
    out_of_order: BTreeSet<u64>,
    received: BTreeMap<u64, Vec<u8>>,
    eof_recorded: bool,
    eof_target: Option<u64>,
}

impl ReassemblyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hcp(&self) -> u64 {
        self.hcp
    }

    pub fn eof_recorded(&self) -> bool {
        self.eof_recorded
    }

    /// The HCP value that, once reached, means every real data packet has
    /// arrived: `None` until the end-of-stream packet itself has been seen.
    pub fn eof_target(&self) -> Option<u64> {
        self.eof_target
    }

    /// All data received: the end-of-stream packet has been seen and HCP
    /// has caught up to it.
    pub fn is_complete(&self) -> bool {
        self.eof_recorded && self.eof_target == Some(self.hcp)
    }

    /// Feed one datagram into the reassembly state machine.
    pub fn accept(&mut self, packet: DataPacket) -> AcceptOutcome {
        if !packet.verify_checksum() {
            return AcceptOutcome::ChecksumFailed;
        }

        if packet.end_of_file {
            self.eof_recorded = true;
            self.eof_target = Some(packet.sequence_number.saturating_sub(1));
            return AcceptOutcome::EndOfStreamRecorded;
        }

        let p = packet.sequence_number;
        if p <= self.hcp || self.out_of_order.contains(&p) {
            return AcceptOutcome::Duplicate;
        }

        self.received.insert(p, packet.data);

        if p == self.hcp + 1 {
            self.hcp = p;
            while self.out_of_order.remove(&(self.hcp + 1)) {
                self.hcp += 1;
            }
        } else {
            self.out_of_order.insert(p);
        }

        AcceptOutcome::Accepted { ack_hcp: self.hcp }
    }

    /// Concatenate every accepted payload in ascending sequence-number
    /// order. Called once, after the receive loop terminates.
    pub fn assemble_output(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for payload in self.received.values() {
            out.extend_from_slice(payload);
        }
        out
    }
}
