//! Sender-side shared state: the packet archive, the outstanding-packet
//! map, and cumulative-ack bookkeeping.
//!
//! These are expressed as explicit values with a well-defined operation
//! set (`record_send`, `mark_acked_upto`, `scan_timeouts`, `is_empty`)
//! behind a single lock each, rather than worker threads reaching into a
//! shared map directly.

use std::collections::HashMap;
use std::sync::Mutex;

use quanta::Instant;

use crate::wire::DataPacket;

/// Write-once-per-sequence-number store of every packet the sender has
/// ever produced. Written only by the input-reading worker; read by the
/// ack-processing worker for fast-retransmit lookups.
#[derive(Default)]
pub struct PacketArchive {
    packets: Mutex<HashMap<u64, DataPacket>>,
}

impl PacketArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, packet: DataPacket) {
        let mut guard = self.packets.lock().expect("archive lock poisoned");
        guard.insert(packet.sequence_number, packet);
    }

    pub fn get(&self, sequence_number: u64) -> Option<DataPacket> {
        self.packets
            .lock()
            .expect("archive lock poisoned")
            .get(&sequence_number)
            .cloned()
    }
}

/// Tracks every packet transmitted but not yet acknowledged, alongside the
/// monotonic instant it was last (re)transmitted.
#[derive(Default)]
pub struct OutstandingTracker {
    inner: Mutex<HashMap<u64, Instant>>,
}

impl OutstandingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or refresh) the send-time for a sequence number. Repeated
    /// calls for the same sequence number overwrite the prior send-time,
    /// which is what a retransmit is supposed to do.
    pub fn record_send(&self, sequence_number: u64, at: Instant) {
        self.inner
            .lock()
            .expect("outstanding lock poisoned")
            .insert(sequence_number, at);
    }

    /// Remove every sequence number in `(below_and_excluding, upto]` —
    /// i.e. every sequence number newly covered by HCA advancing to `upto`.
    pub fn mark_acked_upto(&self, upto: u64) {
        self.inner
            .lock()
            .expect("outstanding lock poisoned")
            .retain(|&seq, _| seq > upto);
    }

    /// Remove and return every sequence number whose last send-time is at
    /// least `timeout` old as of `now`.
    pub fn scan_timeouts(&self, now: Instant, timeout: std::time::Duration) -> Vec<u64> {
        let mut guard = self.inner.lock().expect("outstanding lock poisoned");
        let expired: Vec<u64> = guard
            .iter()
            .filter(|(_, &sent)| now.saturating_duration_since(sent) >= timeout)
            .map(|(&seq, _)| seq)
            .collect();
        for seq in &expired {
            guard.remove(seq);
        }
        expired
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().expect("outstanding lock poisoned").is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }
}

/// Cumulative-ack state on the sender side: the highest cumulative ack
/// (HCA) and the run-length of consecutive duplicate acks received at HCA.
pub struct AckState {
    hca: u64,
    duplicate_count: u32,
    threshold: u32,
}

/// Result of feeding an incoming ack into [`AckState::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// Ack was for a sequence number already covered by HCA; ignored.
    Stale,
    /// Ack repeated HCA; duplicate count incremented but below threshold.
    Duplicate,
    /// Ack repeated HCA and hit the fast-retransmit threshold. The caller
    /// should retransmit sequence `hca + 1`. The counter is reset.
    FastRetransmit { retransmit_seq: u64 },
    /// HCA advanced to a new value.
    Advanced { new_hca: u64 },
}

impl AckState {
    pub fn new(threshold: u32) -> Self {
        AckState {
            hca: 0,
            duplicate_count: 0,
            threshold,
        }
    }

    pub fn hca(&self) -> u64 {
        self.hca
    }

    /// Feed an incoming acknowledged-sequence-number `a` (the end-of-stream
    /// case is handled separately by the caller before this is reached).
    pub fn observe(&mut self, a: u64) -> AckOutcome {
        if a < self.hca {
            AckOutcome::Stale
        } else if a == self.hca {
            self.duplicate_count += 1;
            if self.duplicate_count >= self.threshold {
                self.duplicate_count = 0;
                AckOutcome::FastRetransmit {
                    retransmit_seq: self.hca + 1,
                }
            } else {
                AckOutcome::Duplicate
            }
        } else {
            self.hca = a;
            self.duplicate_count = 0;
            AckOutcome::Advanced { new_hca: a }
        }
    }
}

/// Idle-tick counter driving `TimeoutMonitor`'s shutdown decision: the
/// sender gives up once the outstanding map has been empty for
/// `idle_tick_limit` consecutive polls.
pub struct IdleCounter {
    ticks: u32,
    limit: u32,
}

impl IdleCounter {
    pub fn new(limit: u32) -> Self {
        IdleCounter { ticks: 0, limit }
    }

    /// Call once per poll with whether the outstanding map was empty this
    /// tick. Returns `true` once the limit has been reached.
    pub fn tick(&mut self, outstanding_empty: bool) -> bool {
        if outstanding_empty {
            self.ticks += 1;
            self.ticks >= self.limit
        } else {
            self.ticks = 0;
            false
        }
    }
}
