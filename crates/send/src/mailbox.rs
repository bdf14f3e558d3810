//! One-shot shutdown signaling between `SocketReader` and `TimeoutMonitor`.
//!
//! Exactly one direction fires per run — either `SocketReader` sees the
//! end-of-stream ack and tells `TimeoutMonitor` to stop, or
//! `TimeoutMonitor` sees a sustained idle outstanding map and tells
//! `SocketReader` to stop — so a single shared bounded channel, with both
//! ends cloned onto both threads, is enough; there's no need for two
//! directional mailboxes.

use crossbeam_channel::{Receiver, Sender};

#[derive(Clone)]
pub struct Mailbox {
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl Mailbox {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::bounded(2);
        Mailbox { tx, rx }
    }

    /// Signal quit. Never blocks: the channel has headroom for both
    /// possible senders and the message is only ever consumed once.
    pub fn signal(&self) {
        let _ = self.tx.try_send(());
    }

    /// Non-blocking poll for a pending quit signal.
    pub fn poll(&self) -> bool {
        self.rx.try_recv().is_ok()
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}
