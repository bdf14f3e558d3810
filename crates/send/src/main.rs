//! Sender endpoint.
//!
//! Reads binary input from standard input, fragments it, and reliably
//! delivers it to a peer `recv` process over an unreliable datagram
//! socket. Four workers cooperate: [`input_reader`], [`socket_writer`],
//! [`socket_reader`], [`timeout_monitor`].

mod input_reader;
mod mailbox;
mod pending_queue;
mod socket_reader;
mod socket_writer;
mod timeout_monitor;

use std::net::{SocketAddr, UdpSocket};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use clap::Parser;
use rdt_core::config::SenderConfig;
use rdt_core::stats::SenderStats;
use rdt_core::tracker::{AckState, OutstandingTracker, PacketArchive};
use tracing_subscriber::EnvFilter;

use mailbox::Mailbox;
use pending_queue::PendingQueue;

/// Reliable datagram stream sender.
#[derive(Parser, Debug)]
#[command(name = "send", about = "Reliably streams stdin to a recv peer over UDP")]
struct Cli {
    /// Destination host.
    host: String,

    /// Destination port.
    port: u16,

    /// Maximum payload bytes per data packet.
    #[arg(long, default_value_t = rdt_core::wire::DEFAULT_FRAGMENT_SIZE)]
    fragment_size: usize,

    /// Retransmit timeout in milliseconds.
    #[arg(long, default_value_t = 600)]
    timeout_ms: u64,

    /// Duplicate-ack count that triggers a fast-retransmit.
    #[arg(long, default_value_t = rdt_core::wire::DEFAULT_FAST_RETRANSMIT_THRESHOLD)]
    fast_retransmit_threshold: u32,

    /// `tracing` log level / `EnvFilter` directive.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone())),
        )
        .init();

    let dest: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .map_err(|source| rdt_core::TransportError::InvalidAddress {
            addr: format!("{}:{}", cli.host, cli.port),
            source,
        })?;

    tracing::info!(host = %cli.host, port = cli.port, fragment_size = cli.fragment_size, "send starting");

    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect(dest)?;
    socket.set_read_timeout(Some(rdt_core::wire::TIMEOUT_POLL_INTERVAL))?;

    let config = SenderConfig {
        fragment_size: cli.fragment_size,
        timeout: Duration::from_millis(cli.timeout_ms),
        fast_retransmit_threshold: cli.fast_retransmit_threshold,
        ..SenderConfig::default()
    };

    let archive = Arc::new(PacketArchive::new());
    let queue = Arc::new(PendingQueue::new());
    let outstanding = Arc::new(OutstandingTracker::new());
    let ack_state = Arc::new(Mutex::new(AckState::new(config.fast_retransmit_threshold)));
    let mailbox = Mailbox::new();
    let stats = Arc::new(Mutex::new(SenderStats::new()));

    let timeout = config.timeout;
    let poll_interval = config.poll_interval;
    let idle_tick_limit = config.idle_tick_limit;

    let input_handle = {
        let archive = archive.clone();
        let queue = queue.clone();
        let fragment_size = config.fragment_size;
        let stats = stats.clone();
        thread::Builder::new()
            .name("input-reader".into())
            .spawn(move || input_reader::run(std::io::stdin().lock(), fragment_size, archive, queue, stats))
            .expect("failed to spawn InputReader")
    };

    let writer_handle = {
        let socket = socket.try_clone()?;
        let queue = queue.clone();
        let outstanding = outstanding.clone();
        let stats = stats.clone();
        thread::Builder::new()
            .name("socket-writer".into())
            .spawn(move || socket_writer::run(&socket, queue, outstanding, stats))
            .expect("failed to spawn SocketWriter")
    };

    let reader_handle = {
        let socket = socket.try_clone()?;
        let queue = queue.clone();
        let outstanding = outstanding.clone();
        let archive = archive.clone();
        let ack_state = ack_state.clone();
        let mailbox = mailbox.clone();
        let stats = stats.clone();
        thread::Builder::new()
            .name("socket-reader".into())
            .spawn(move || socket_reader::run(&socket, queue, outstanding, archive, ack_state, mailbox, stats))
            .expect("failed to spawn SocketReader")
    };

    let timeout_handle = {
        let queue = queue.clone();
        let outstanding = outstanding.clone();
        let archive = archive.clone();
        let mailbox = mailbox.clone();
        let stats = stats.clone();
        thread::Builder::new()
            .name("timeout-monitor".into())
            .spawn(move || {
                timeout_monitor::run(
                    queue,
                    outstanding,
                    archive,
                    mailbox,
                    timeout,
                    poll_interval,
                    idle_tick_limit,
                    stats,
                )
            })
            .expect("failed to spawn TimeoutMonitor")
    };

    input_handle.join().expect("InputReader panicked");
    writer_handle.join().expect("SocketWriter panicked");
    reader_handle.join().expect("SocketReader panicked");
    timeout_handle.join().expect("TimeoutMonitor panicked");

    let final_stats = stats.lock().expect("stats lock poisoned").clone();
    tracing::info!(
        packets_sent = final_stats.packets_sent,
        bytes_sent = final_stats.bytes_sent,
        timeout_retransmits = final_stats.timeout_retransmits,
        fast_retransmits = final_stats.fast_retransmits,
        "send complete"
    );
    Ok(())
}
