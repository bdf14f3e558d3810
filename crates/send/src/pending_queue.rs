//! The sender's pending queue: a thread-safe priority queue ordered by
//! sequence number, multi-producer (InputReader, SocketReader for
//! fast-retransmit, TimeoutMonitor for timeouts) and single-consumer
//! (SocketWriter).
//!
//! `crossbeam_channel` doesn't support priority ordering, so this is a
//! small `Mutex<BinaryHeap> + Condvar` wrapper instead of a channel.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::{Condvar, Mutex};

use rdt_core::wire::DataPacket;

/// An item the pending queue carries: either a packet awaiting
/// (re)transmission, or the quit sentinel.
pub enum Item {
    Packet(DataPacket),
    Quit,
}

/// Orders entries so the lowest sequence number pops first; `Quit` is
/// assigned key `0`, lower than any real sequence number (which start at
/// 1), so a pending quit is always dequeued promptly.
struct Entry {
    key: u64,
    item: Item,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}
impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so `BinaryHeap` (a max-heap) behaves as a min-heap.
        other.key.cmp(&self.key)
    }
}

#[derive(Default)]
pub struct PendingQueue {
    heap: Mutex<BinaryHeap<Entry>>,
    not_empty: Condvar,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_packet(&self, packet: DataPacket) {
        let key = packet.sequence_number;
        let mut heap = self.heap.lock().expect("pending queue lock poisoned");
        heap.push(Entry {
            key,
            item: Item::Packet(packet),
        });
        self.not_empty.notify_one();
    }

    pub fn push_quit(&self) {
        let mut heap = self.heap.lock().expect("pending queue lock poisoned");
        heap.push(Entry {
            key: 0,
            item: Item::Quit,
        });
        self.not_empty.notify_one();
    }

    /// Block until an item is available, then pop the lowest-sequence one.
    pub fn pop(&self) -> Item {
        let mut heap = self.heap.lock().expect("pending queue lock poisoned");
        loop {
            if let Some(entry) = heap.pop() {
                return entry.item;
            }
            heap = self
                .not_empty
                .wait(heap)
                .expect("pending queue condvar poisoned");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkt(seq: u64) -> DataPacket {
        DataPacket::new(seq, b"x".to_vec(), false)
    }

    #[test]
    fn pops_in_ascending_sequence_order_regardless_of_push_order() {
        let q = PendingQueue::new();
        q.push_packet(pkt(3));
        q.push_packet(pkt(1));
        q.push_packet(pkt(2));

        for expected in [1, 2, 3] {
            match q.pop() {
                Item::Packet(p) => assert_eq!(p.sequence_number, expected),
                Item::Quit => panic!("unexpected quit"),
            }
        }
    }

    #[test]
    fn quit_sentinel_dequeues_before_any_real_sequence_number() {
        let q = PendingQueue::new();
        q.push_packet(pkt(1));
        q.push_quit();
        q.push_packet(pkt(2));

        match q.pop() {
            Item::Quit => {}
            Item::Packet(_) => panic!("quit should be dequeued first"),
        }
    }
}
