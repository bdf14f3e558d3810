//! # Integration tests: fragmentation → wire → reassembly
//!
//! No actual sockets or threads — `rdt-core` is pure protocol logic, so
//! the "network" here is just a `Vec<DataPacket>` that test code can drop,
//! reorder, or duplicate before feeding it to [`ReassemblyState`]. The
//! sender-side tracker (`AckState`, `OutstandingTracker`, `PacketArchive`)
//! is exercised directly against the same scenarios.

use rdt_core::reassembly::{AcceptOutcome, ReassemblyState};
use rdt_core::tracker::{AckOutcome, AckState, IdleCounter, OutstandingTracker, PacketArchive};
use rdt_core::wire::{AckPacket, AckTarget, DataPacket};

/// Fragment `input` into `D`-byte data packets plus a trailing
/// end-of-stream packet, numbered from 1.
fn fragment(input: &[u8], d: usize) -> Vec<DataPacket> {
    let mut packets = Vec::new();
    let mut seq = 1u64;
    for chunk in input.chunks(d.max(1)) {
        packets.push(DataPacket::new(seq, chunk.to_vec(), false));
        seq += 1;
    }
    if input.is_empty() {
        // still emit a lone end-of-stream packet
    }
    packets.push(DataPacket::new(seq, Vec::new(), true));
    packets
}

fn feed_all(receiver: &mut ReassemblyState, packets: Vec<DataPacket>) {
    for pkt in packets {
        receiver.accept(pkt);
    }
}

// ─── Scenario 1: lossless, in-order ─────────────────────────────────────────

#[test]
fn lossless_in_order_transfer_reassembles_exactly() {
    let input: Vec<u8> = (0..=255u8).cycle().take(3500).collect();
    let packets = fragment(&input, 1000);
    assert_eq!(packets.len(), 5, "4 data fragments + 1 end-of-stream");

    let mut rx = ReassemblyState::new();
    feed_all(&mut rx, packets);

    assert!(rx.is_complete());
    assert_eq!(rx.assemble_output(), input);
}

// ─── Scenario 2: single-drop retransmit ─────────────────────────────────────

#[test]
fn dropped_packet_is_recovered_once_retransmitted() {
    let input: Vec<u8> = (0..2000u32).map(|i| (i % 256) as u8).collect();
    let mut packets = fragment(&input, 1000); // seq 1, 2, eof(3)

    let mut rx = ReassemblyState::new();
    let dropped = packets.remove(0); // drop packet 1 on first attempt
    feed_all(&mut rx, packets.clone());
    assert!(!rx.is_complete(), "missing packet 1 should block completion");

    // timeout path retransmits packet 1
    let outcome = rx.accept(dropped);
    assert_eq!(outcome, AcceptOutcome::Accepted { ack_hcp: 3 });
    assert!(rx.is_complete());
    assert_eq!(rx.assemble_output(), input);
}

// ─── Scenario 3: reordered delivery ──────────────────────────────────────────

#[test]
fn reordered_delivery_acks_and_assembles_in_order() {
    let input: Vec<u8> = b"abcdefghij".to_vec(); // three 4-byte-ish fragments
    let packets = fragment(&input, 4); // seq 1,2,3 + eof(4)
    assert_eq!(packets.len(), 4);

    let mut rx = ReassemblyState::new();
    // deliver in order 2, 1, 3, eof
    let ack2 = rx.accept(packets[1].clone());
    let ack1 = rx.accept(packets[0].clone());
    let ack3 = rx.accept(packets[2].clone());
    rx.accept(packets[3].clone());

    assert_eq!(ack2, AcceptOutcome::Accepted { ack_hcp: 0 });
    assert_eq!(ack1, AcceptOutcome::Accepted { ack_hcp: 2 });
    assert_eq!(ack3, AcceptOutcome::Accepted { ack_hcp: 3 });
    assert!(rx.is_complete());
    assert_eq!(rx.assemble_output(), input);
}

// ─── Scenario 4: duplicate ack triggers exactly one fast-retransmit ─────────

#[test]
fn duplicate_ack_triggers_exactly_one_fast_retransmit() {
    let archive = PacketArchive::new();
    archive.insert(DataPacket::new(1, b"one".to_vec(), false));
    archive.insert(DataPacket::new(2, b"two".to_vec(), false));
    archive.insert(DataPacket::new(3, b"three".to_vec(), false));

    let mut acks = AckState::new(2);
    // ack for packet 1 arrives, advancing HCA to 1
    assert_eq!(acks.observe(1), AckOutcome::Advanced { new_hca: 1 });
    // two more acks for packet 1 arrive (duplicate acks at HCA=1, since 2/3 were lost)
    assert_eq!(acks.observe(1), AckOutcome::Duplicate);
    let third = acks.observe(1);
    assert_eq!(third, AckOutcome::FastRetransmit { retransmit_seq: 2 });

    let AckOutcome::FastRetransmit { retransmit_seq } = third else {
        panic!("expected fast retransmit")
    };
    let retransmitted = archive.get(retransmit_seq).expect("archive has packet 2");
    assert_eq!(retransmitted.sequence_number, 2);

    // further duplicate acks at the same HCA start a fresh count, no second
    // retransmit until the threshold is hit again
    assert_eq!(acks.observe(1), AckOutcome::Duplicate);
}

// ─── Scenario 5: end-of-stream ack redundancy ───────────────────────────────

#[test]
fn eof_ack_redundancy_survives_all_but_one_drop() {
    // Drives the actual completion gate (`ReassemblyState::is_complete`)
    // and the actual wire type the receiver emits once it fires
    // (`AckPacket::new(AckTarget::EndOfStream)`, repeated
    // `wire::EOF_ACK_REPEAT` times per `recv/main.rs`'s `send_eof_ack`),
    // rather than asserting on bare arithmetic.
    let input = b"end to end".to_vec();
    let packets = fragment(&input, 4); // several data fragments + eof

    let mut rx = ReassemblyState::new();
    for (i, pkt) in packets.iter().enumerate() {
        rx.accept(pkt.clone());
        let is_last = i + 1 == packets.len();
        assert_eq!(
            rx.is_complete(),
            is_last,
            "completion must only flip true once every packet, including eof, lands"
        );
    }
    assert!(rx.is_complete());

    // The redundant acks the receiver would now emit.
    let redundant_acks: Vec<AckPacket> = (0..rdt_core::wire::EOF_ACK_REPEAT)
        .map(|_| AckPacket::new(AckTarget::EndOfStream))
        .collect();
    assert_eq!(redundant_acks.len(), 10);

    // Network drops 9 of the 10; only the last survives.
    let delivered: Vec<&AckPacket> = redundant_acks.iter().skip(9).collect();
    assert_eq!(delivered.len(), 1);

    // The sender's SocketReader only needs one valid, checksum-verified
    // `EndOfStream` ack to begin shutdown.
    let survivor = delivered[0];
    assert!(survivor.verify_checksum());
    assert_eq!(survivor.acknowledged, AckTarget::EndOfStream);

    // Every redundant copy is wire-identical and independently valid, so
    // it does not matter which one of the ten is the survivor.
    for ack in &redundant_acks {
        assert!(ack.verify_checksum());
        assert_eq!(ack.acknowledged, AckTarget::EndOfStream);
    }
}

// ─── Scenario 6: sender orphaned, idle timeout fires ────────────────────────

#[test]
fn idle_sender_gives_up_after_three_empty_ticks() {
    let outstanding = OutstandingTracker::new();
    let mut idle = IdleCounter::new(3);

    // receiver acked everything; outstanding map has been drained.
    assert!(outstanding.is_empty());
    assert!(!idle.tick(outstanding.is_empty()));
    assert!(!idle.tick(outstanding.is_empty()));
    assert!(idle.tick(outstanding.is_empty()), "third empty tick should fire shutdown");
}

// ─── Invariants ──────────────────────────────────────────────────────────────

#[test]
fn hcp_never_decreases_across_arbitrary_delivery_order() {
    let input: Vec<u8> = (0..100u8).collect();
    let mut packets = fragment(&input, 10); // 10 fragments + eof
    // reverse delivery order, worst case for monotonicity
    packets.reverse();

    let mut rx = ReassemblyState::new();
    let mut last_hcp = 0;
    for pkt in packets {
        rx.accept(pkt);
        assert!(rx.hcp() >= last_hcp);
        last_hcp = rx.hcp();
    }
    assert!(rx.is_complete());
    assert_eq!(rx.assemble_output(), input);
}

#[test]
fn hca_never_decreases_across_arbitrary_ack_order() {
    let mut acks = AckState::new(2);
    let mut last_hca = 0;
    for a in [0, 2, 2, 1, 3, 3, 3] {
        acks.observe(a);
        assert!(acks.hca() >= last_hca);
        last_hca = acks.hca();
    }
}
