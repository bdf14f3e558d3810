//! Periodically scans the outstanding map for timed-out transmissions and
//! re-enqueues them; terminates the sender once the outstanding map has
//! been empty for `idle_tick_limit` consecutive polls (the end-of-stream
//! ack may have been lost entirely, and without this the sender would
//! hang forever).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use quanta::Instant;
use rdt_core::stats::SenderStats;
use rdt_core::tracker::{IdleCounter, OutstandingTracker, PacketArchive};

use crate::mailbox::Mailbox;
use crate::pending_queue::PendingQueue;

#[allow(clippy::too_many_arguments)]
pub fn run(
    queue: Arc<PendingQueue>,
    outstanding: Arc<OutstandingTracker>,
    archive: Arc<PacketArchive>,
    mailbox: Mailbox,
    timeout: Duration,
    poll_interval: Duration,
    idle_tick_limit: u32,
    stats: Arc<Mutex<SenderStats>>,
) {
    tracing::info!("TimeoutMonitor starting");
    let mut idle = IdleCounter::new(idle_tick_limit);

    loop {
        if mailbox.poll() {
            tracing::info!("TimeoutMonitor observed shutdown signal");
            break;
        }

        if outstanding.is_empty() {
            if idle.tick(true) {
                tracing::info!("outstanding map empty for too long, terminating");
                mailbox.signal();
                queue.push_quit();
                break;
            }
        } else {
            idle.tick(false);
            let now = Instant::now();
            let expired = outstanding.scan_timeouts(now, timeout);
            for seq in expired {
                match archive.get(seq) {
                    Some(packet) => {
                        tracing::debug!(sequence_number = seq, "timeout retransmit");
                        stats.lock().expect("stats lock poisoned").timeout_retransmits += 1;
                        queue.push_packet(packet);
                    }
                    None => {
                        debug_assert!(false, "archive miss on timeout retransmit for sequence {seq}");
                    }
                }
            }
        }

        std::thread::sleep(poll_interval);
    }

    tracing::info!("TimeoutMonitor done");
}
