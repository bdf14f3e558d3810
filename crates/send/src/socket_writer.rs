//! Drains the pending queue onto the datagram socket; records each
//! successful transmission in the outstanding map with a fresh monotonic
//! send-time.

use std::net::UdpSocket;
use std::sync::{Arc, Mutex};

use quanta::Instant;
use rdt_core::stats::SenderStats;
use rdt_core::tracker::OutstandingTracker;

use crate::pending_queue::{Item, PendingQueue};

pub fn run(
    socket: &UdpSocket,
    queue: Arc<PendingQueue>,
    outstanding: Arc<OutstandingTracker>,
    stats: Arc<Mutex<SenderStats>>,
) {
    tracing::info!("SocketWriter starting");

    loop {
        match queue.pop() {
            Item::Quit => break,
            Item::Packet(packet) => {
                let seq = packet.sequence_number;
                let bytes = match serde_json::to_vec(&packet) {
                    Ok(b) => b,
                    Err(err) => {
                        tracing::error!(sequence_number = seq, error = %err, "failed to serialize packet");
                        continue;
                    }
                };

                match socket.send(&bytes) {
                    Ok(sent) => {
                        if sent != bytes.len() {
                            tracing::error!(
                                sequence_number = seq,
                                sent,
                                expected = bytes.len(),
                                "short send — treating as lost, timeout path will recover"
                            );
                        }
                        outstanding.record_send(seq, Instant::now());
                        stats.lock().expect("stats lock poisoned").packets_sent += 1;
                        tracing::debug!(sequence_number = seq, "SocketWriter sent packet");
                    }
                    Err(err) => {
                        tracing::warn!(sequence_number = seq, error = %err, "transient send error");
                    }
                }
            }
        }
    }

    tracing::info!("SocketWriter done");
}
