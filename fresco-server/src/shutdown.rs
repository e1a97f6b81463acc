//! Idempotent shutdown coordination.
//!
//! Several entry points can ask the process to stop: an interrupt
//! signal, a termination signal, or a fault in the accept loop. The
//! coordinator latches on the first trigger and turns every later one
//! into a logged no-op, so exactly one shutdown sequence runs.

use tokio::sync::watch;

/// One-shot shutdown latch shared across tasks.
///
/// Cloneable; all clones observe the same latch. A `watch` channel
/// keeps its value, so a task that starts waiting after the trigger
/// still wakes immediately.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    tx: watch::Sender<bool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Request shutdown. Returns `true` for the first caller only.
    pub fn trigger(&self, reason: &str) -> bool {
        let first = !self.tx.send_replace(true);
        if first {
            log::info!("Shutdown triggered: {reason}");
        } else {
            log::debug!("Shutdown already in progress, ignoring trigger: {reason}");
        }
        first
    }

    /// Wait until shutdown has been triggered.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot error here
        let _ = rx.wait_for(|triggered| *triggered).await;
    }

    /// Whether shutdown has been triggered.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
