//! Construction-time configuration objects passed into the otherwise-pure
//! sender/receiver state machines. Two endpoints only interoperate when
//! `fragment_size`, `timeout`, and `fast_retransmit_threshold` agree.

use std::time::Duration;

use crate::wire::{
    DEFAULT_FAST_RETRANSMIT_THRESHOLD, DEFAULT_FRAGMENT_SIZE, DEFAULT_TIMEOUT,
    TIMEOUT_POLL_INTERVAL,
};

/// Sender-side tuning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenderConfig {
    /// Maximum payload bytes per data packet (`D`).
    pub fragment_size: usize,
    /// Fixed retransmit timeout.
    pub timeout: Duration,
    /// Duplicate-ack count that triggers a fast-retransmit (`K`).
    pub fast_retransmit_threshold: u32,
    /// `TimeoutMonitor` poll cadence.
    pub poll_interval: Duration,
    /// Consecutive empty-outstanding-map ticks before the sender gives up.
    pub idle_tick_limit: u32,
}

impl Default for SenderConfig {
    fn default() -> Self {
        SenderConfig {
            fragment_size: DEFAULT_FRAGMENT_SIZE,
            timeout: DEFAULT_TIMEOUT,
            fast_retransmit_threshold: DEFAULT_FAST_RETRANSMIT_THRESHOLD,
            poll_interval: TIMEOUT_POLL_INTERVAL,
            idle_tick_limit: crate::wire::IDLE_TICK_LIMIT,
        }
    }
}

/// Receiver-side tuning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverConfig {
    /// Socket receive timeout; guarantees eventual termination if the
    /// sender vanishes.
    pub receive_timeout: Duration,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        ReceiverConfig {
            receive_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_config_defaults_match_spec_constants() {
        let cfg = SenderConfig::default();
        assert_eq!(cfg.fragment_size, 1000);
        assert_eq!(cfg.timeout, Duration::from_millis(600));
        assert_eq!(cfg.fast_retransmit_threshold, 2);
        assert_eq!(cfg.idle_tick_limit, 3);
    }

    #[test]
    fn receiver_config_default_timeout_is_30s() {
        assert_eq!(ReceiverConfig::default().receive_timeout, Duration::from_secs(30));
    }
}
