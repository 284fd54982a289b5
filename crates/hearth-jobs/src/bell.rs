//! Wake-up tokens between the producer and the workers.
//!
//! A doorbell is a bounded channel of `()` tokens. Ringing never blocks
//! (a full channel already guarantees a pending wake-up); waiting is
//! bounded by a timeout so a token taken by another waiter costs at most
//! one poll interval.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};

pub(crate) struct Doorbell {
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl Doorbell {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));
        Self { tx, rx }
    }

    pub(crate) fn ring(&self) {
        match self.tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            // We hold the receiver, so the channel cannot disconnect.
            Err(TrySendError::Disconnected(())) => {}
        }
    }

    /// Ring `n` times, e.g. once per sleeping worker at shutdown.
    pub(crate) fn ring_n(&self, n: usize) {
        for _ in 0..n {
            self.ring();
        }
    }

    /// Wait for a token. Returns `true` if one arrived before `timeout`.
    pub(crate) fn wait(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_then_wait_consumes_token() {
        let bell = Doorbell::new(4);
        bell.ring();
        assert!(bell.wait(Duration::from_millis(1)));
        assert!(!bell.wait(Duration::from_millis(1)));
    }

    #[test]
    fn ringing_a_full_bell_does_not_block() {
        let bell = Doorbell::new(2);
        bell.ring_n(10);
        assert!(bell.wait(Duration::ZERO));
        assert!(bell.wait(Duration::ZERO));
        assert!(!bell.wait(Duration::from_millis(1)));
    }
}
