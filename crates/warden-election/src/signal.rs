//! One-shot shutdown signal shared between the agent and its renewal task.

use tokio::sync::watch;

/// Process-wide cancellation flag.
///
/// Created once at agent construction, signalled exactly once at shutdown,
/// never reset. Signalling is idempotent and never blocks; a second call is
/// a no-op. Clones observe the same signal.
#[derive(Clone)]
pub struct DoneSignal {
    tx: watch::Sender<bool>,
    rx: watch::Receiver<bool>,
}

impl DoneSignal {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx, rx }
    }

    /// Fire the signal. Safe to call more than once.
    pub fn signal(&self) {
        // send_replace never fails even with no receivers alive.
        self.tx.send_replace(true);
    }

    pub fn is_signalled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves when the signal fires; resolves immediately if it already has.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // wait_for returns as soon as the predicate holds, including for the
        // current value. An error means the sender is gone, which can only
        // happen after a signal or full teardown; treat it as cancelled.
        let _ = rx.wait_for(|done| *done).await;
    }
}

impl Default for DoneSignal {
    fn default() -> Self {
        Self::new()
    }
}
