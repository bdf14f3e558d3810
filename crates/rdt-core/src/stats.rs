//! # Transport statistics
//!
//! Lightweight counters for observability, logged at lifecycle milestones
//! rather than exported anywhere — this protocol has no metrics sink.

use serde::Serialize;

// ─── Sender Stats ───────────────────────────────────────────────────────────

/// Aggregate sender-side statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SenderStats {
    /// Total packets sent, including retransmissions.
    pub packets_sent: u64,
    /// Total original bytes read from the input stream.
    pub bytes_sent: u64,
    /// Retransmissions triggered by the timeout path.
    pub timeout_retransmits: u64,
    /// Retransmissions triggered by the fast-retransmit path.
    pub fast_retransmits: u64,
}

impl SenderStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overall retransmission overhead ratio.
    pub fn retransmit_ratio(&self) -> f64 {
        if self.packets_sent == 0 {
            0.0
        } else {
            let retransmits = self.timeout_retransmits + self.fast_retransmits;
            retransmits as f64 / self.packets_sent as f64
        }
    }
}

// ─── Receiver Stats ─────────────────────────────────────────────────────────

/// Aggregate receiver-side statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReceiverStats {
    /// Total datagrams received (including duplicates and checksum failures).
    pub packets_received: u64,
    /// Packets dropped for failing checksum verification.
    pub checksum_failures: u64,
    /// Duplicate or already-superseded packets dropped.
    pub duplicates: u64,
    /// Highest cumulative packet sequence number delivered so far.
    pub highest_delivered_seq: u64,
    /// Total bytes emitted to the output stream.
    pub bytes_delivered: u64,
}

impl ReceiverStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of received datagrams that were usable (not duplicate or
    /// checksum-failed).
    pub fn goodput_ratio(&self) -> f64 {
        if self.packets_received == 0 {
            0.0
        } else {
            let wasted = self.duplicates + self.checksum_failures;
            let useful = self.packets_received.saturating_sub(wasted);
            useful as f64 / self.packets_received as f64
        }
    }
}
