//! Receiver endpoint.
//!
//! Binds a datagram socket on `(any, port)`, validates and reassembles
//! incoming data packets into an ordered byte stream, and writes the
//! result to standard output once the end-of-stream handshake completes
//! (or the socket's receive timeout elapses, whichever comes first).

use std::io::Write;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use clap::Parser;
use rdt_core::config::ReceiverConfig;
use rdt_core::reassembly::{AcceptOutcome, ReassemblyState};
use rdt_core::stats::ReceiverStats;
use rdt_core::wire::{AckPacket, AckTarget, MAX_DATAGRAM_SIZE};
use tracing_subscriber::EnvFilter;

/// Reliable datagram stream receiver.
#[derive(Parser, Debug)]
#[command(name = "recv", about = "Reassembles a reliable byte stream and writes it to stdout")]
struct Cli {
    /// Port to bind on (any interface).
    port: u16,

    /// Socket receive timeout in milliseconds; guarantees eventual
    /// termination if the sender vanishes.
    #[arg(long, default_value_t = 30_000)]
    receive_timeout_ms: u64,

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

    tracing::info!(port = cli.port, "recv starting");

    let config = ReceiverConfig {
        receive_timeout: Duration::from_millis(cli.receive_timeout_ms),
        ..ReceiverConfig::default()
    };

    let socket = UdpSocket::bind(("0.0.0.0", cli.port))?;
    socket.set_read_timeout(Some(config.receive_timeout))?;

    let mut state = ReassemblyState::new();
    let mut stats = ReceiverStats::new();
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
    let mut peer: Option<SocketAddr> = None;

    loop {
        if state.is_complete() {
            let addr = peer.expect("cannot be complete without having seen a sender");
            send_eof_ack(&socket, addr);
            tracing::info!("end-of-stream reached, sent redundant acks, flushing output");
            break;
        }

        let (n, src) = match socket.recv_from(&mut buf) {
            Ok(pair) => pair,
            Err(err) if would_block(&err) => {
                tracing::warn!("receive timeout elapsed, terminating with whatever was received");
                break;
            }
            Err(err) => return Err(err.into()),
        };

        peer = Some(src);
        stats.packets_received += 1;

        let packet = match serde_json::from_slice(&buf[..n]) {
            Ok(pkt) => pkt,
            Err(_) => {
                stats.checksum_failures += 1;
                continue;
            }
        };

        match state.accept(packet) {
            AcceptOutcome::ChecksumFailed => {
                stats.checksum_failures += 1;
                tracing::debug!("dropped packet with invalid checksum");
            }
            AcceptOutcome::Duplicate => {
                stats.duplicates += 1;
            }
            AcceptOutcome::EndOfStreamRecorded => {
                tracing::debug!("end-of-stream packet recorded");
            }
            AcceptOutcome::Accepted { ack_hcp } => {
                stats.highest_delivered_seq = ack_hcp;
                send_ack(&socket, src, AckTarget::Sequence(ack_hcp));
            }
        }
    }

    let output = state.assemble_output();
    stats.bytes_delivered = output.len() as u64;
    std::io::stdout().write_all(&output)?;
    std::io::stdout().flush()?;

    tracing::info!(
        packets_received = stats.packets_received,
        bytes_delivered = stats.bytes_delivered,
        duplicates = stats.duplicates,
        checksum_failures = stats.checksum_failures,
        "recv complete"
    );
    Ok(())
}

fn send_ack(socket: &UdpSocket, dest: SocketAddr, target: AckTarget) {
    let ack = AckPacket::new(target);
    match serde_json::to_vec(&ack) {
        Ok(bytes) => {
            if let Err(err) = socket.send_to(&bytes, dest) {
                tracing::warn!(error = %err, "failed to send ack");
            }
        }
        Err(err) => tracing::error!(error = %err, "failed to serialize ack"),
    }
}

fn send_eof_ack(socket: &UdpSocket, dest: SocketAddr) {
    for _ in 0..rdt_core::wire::EOF_ACK_REPEAT {
        send_ack(socket, dest, AckTarget::EndOfStream);
    }
}

fn would_block(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}
