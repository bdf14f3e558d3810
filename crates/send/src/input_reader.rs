//! Reads the input stream, fragments it into `fragment_size`-byte
//! payloads, numbers them from 1, and pushes data packets — then the
//! trailing end-of-stream packet — onto the pending queue.
//!
//! The archive is populated before the pending queue on every packet, so
//! a fast-retransmit lookup by `SocketReader` never races ahead of the
//! archive insert.

use std::io::Read;
use std::sync::{Arc, Mutex};

use rdt_core::stats::SenderStats;
use rdt_core::tracker::PacketArchive;
use rdt_core::wire::DataPacket;

use crate::pending_queue::PendingQueue;

pub fn run(
    mut input: impl Read,
    fragment_size: usize,
    archive: Arc<PacketArchive>,
    queue: Arc<PendingQueue>,
    stats: Arc<Mutex<SenderStats>>,
) {
    tracing::info!("InputReader starting");
    let mut sequence_number: u64 = 0;
    let mut buf = vec![0u8; fragment_size.max(1)];

    loop {
        let n = match input.read(&mut buf) {
            Ok(n) => n,
            Err(err) => {
                tracing::error!(error = %err, "InputReader read failed, terminating stream");
                0
            }
        };

        sequence_number += 1;

        if n == 0 {
            let eof = DataPacket::new(sequence_number, Vec::new(), true);
            archive.insert(eof.clone());
            queue.push_packet(eof);
            tracing::info!(sequence_number, "InputReader reached end of input, enqueued end-of-stream packet");
            break;
        }

        let packet = DataPacket::new(sequence_number, buf[..n].to_vec(), false);
        archive.insert(packet.clone());
        queue.push_packet(packet);
        stats.lock().expect("stats lock poisoned").bytes_sent += n as u64;
        tracing::debug!(sequence_number, bytes = n, "InputReader enqueued data packet");
    }

    tracing::info!("InputReader done");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn fragments_input_into_numbered_packets_plus_eof() {
        let archive = Arc::new(PacketArchive::new());
        let queue = Arc::new(PendingQueue::new());
        let stats = Arc::new(Mutex::new(SenderStats::new()));
        let input = Cursor::new(b"hello world".to_vec());

        run(input, 5, archive.clone(), queue.clone(), stats.clone());

        let p1 = archive.get(1).unwrap();
        assert_eq!(p1.data, b"hello");
        let p2 = archive.get(2).unwrap();
        assert_eq!(p2.data, b" worl");
        let p3 = archive.get(3).unwrap();
        assert_eq!(p3.data, b"d");
        let p4 = archive.get(4).unwrap();
        assert!(p4.end_of_file);
        assert!(p4.data.is_empty());
        assert_eq!(stats.lock().unwrap().bytes_sent, 11);
    }

    #[test]
    fn empty_input_produces_only_an_eof_packet() {
        let archive = Arc::new(PacketArchive::new());
        let queue = Arc::new(PendingQueue::new());
        let stats = Arc::new(Mutex::new(SenderStats::new()));
        let input = Cursor::new(Vec::new());

        run(input, 10, archive.clone(), queue.clone(), stats.clone());

        let eof = archive.get(1).unwrap();
        assert!(eof.end_of_file);
        assert!(eof.data.is_empty());
        assert_eq!(stats.lock().unwrap().bytes_sent, 0);
    }
}
