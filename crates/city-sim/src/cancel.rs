//! Cooperative cancellation of a running simulation.

use std::sync::Arc;

use tokio::sync::watch;

/// Shared flag that stops `Sim::run` and abandons in-flight oracle calls.
///
/// Cloned handles control the same simulation.  Cancellation is sticky until
/// [`CancelHandle::reset`].
#[derive(Clone, Debug)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Clear the flag so the simulation can be resumed.
    pub fn reset(&self) {
        self.tx.send_replace(false);
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Resolves once `rx` observes cancellation; never if the sender is gone.
pub(crate) async fn cancelled(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|&c| c).await.is_err() {
        std::future::pending::<()>().await;
    }
}
