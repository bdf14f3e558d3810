//! Receives ack datagrams, advances cumulative-ack state, triggers
//! fast-retransmit on duplicate acks, and initiates shutdown on the
//! end-of-stream ack.
//!
//! The socket is configured with a short receive timeout so this loop can
//! poll the shutdown mailbox between blocking receives rather than
//! hanging forever with nothing left to receive.

use std::net::UdpSocket;
use std::sync::{Arc, Mutex};

use rdt_core::stats::SenderStats;
use rdt_core::tracker::{AckOutcome, AckState, OutstandingTracker, PacketArchive};
use rdt_core::wire::{AckPacket, AckTarget, MAX_DATAGRAM_SIZE};

use crate::mailbox::Mailbox;
use crate::pending_queue::PendingQueue;

pub fn run(
    socket: &UdpSocket,
    queue: Arc<PendingQueue>,
    outstanding: Arc<OutstandingTracker>,
    archive: Arc<PacketArchive>,
    ack_state: Arc<Mutex<AckState>>,
    mailbox: Mailbox,
    stats: Arc<Mutex<SenderStats>>,
) {
    tracing::info!("SocketReader starting");
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];

    loop {
        if mailbox.poll() {
            queue.push_quit();
            tracing::info!("SocketReader observed shutdown signal");
            break;
        }

        let n = match socket.recv(&mut buf) {
            Ok(n) => n,
            Err(err) if would_block(&err) => continue,
            Err(err) => {
                tracing::warn!(error = %err, "transient socket read error");
                continue;
            }
        };

        let ack: AckPacket = match serde_json::from_slice(&buf[..n]) {
            Ok(ack) => ack,
            Err(_) => continue,
        };
        if !ack.verify_checksum() {
            tracing::debug!("dropped ack with invalid checksum");
            continue;
        }

        match ack.acknowledged {
            AckTarget::EndOfStream => {
                tracing::info!("SocketReader observed end-of-stream ack, shutting down");
                queue.push_quit();
                mailbox.signal();
                break;
            }
            AckTarget::Sequence(a) => {
                let outcome = ack_state.lock().expect("ack state lock poisoned").observe(a);
                match outcome {
                    AckOutcome::Stale => {}
                    AckOutcome::Duplicate => {}
                    AckOutcome::FastRetransmit { retransmit_seq } => {
                        match archive.get(retransmit_seq) {
                            Some(packet) => {
                                tracing::debug!(sequence_number = retransmit_seq, "fast-retransmit");
                                stats.lock().expect("stats lock poisoned").fast_retransmits += 1;
                                queue.push_packet(packet);
                            }
                            None => {
                                debug_assert!(
                                    false,
                                    "archive miss on fast-retransmit for sequence {retransmit_seq}"
                                );
                                tracing::error!(
                                    sequence_number = retransmit_seq,
                                    "archive miss on fast-retransmit"
                                );
                            }
                        }
                    }
                    AckOutcome::Advanced { new_hca } => {
                        outstanding.mark_acked_upto(new_hca);
                        tracing::debug!(hca = new_hca, "HCA advanced");
                    }
                }
            }
        }
    }

    tracing::info!("SocketReader done");
}

fn would_block(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}
