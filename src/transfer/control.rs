//! Cooperative cancellation flag shared between the foreground loop and
//! the transfer worker.

use std::sync::Arc;

use tokio::sync::watch;

/// Level-triggered cancel signal. The foreground sets it, the worker
/// observes it at block boundaries; never a hard abort.
#[derive(Clone)]
pub struct TransferControl {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl TransferControl {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    /// Clear the flag so later transfers start unaffected.
    pub fn reset(&self) {
        let _ = self.tx.send(false);
    }
}

impl Default for TransferControl {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_and_reset_roundtrip() {
        let control = TransferControl::new();
        assert!(!control.is_cancelled());

        control.cancel();
        assert!(control.is_cancelled());
        // Clones observe the same flag.
        assert!(control.clone().is_cancelled());

        control.reset();
        assert!(!control.is_cancelled());
    }
}
