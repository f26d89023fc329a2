use tokio::sync::watch;
use tracing::debug;

use crate::concurrency::signal::{SignalRx, SignalTx, create_signal};

/// Broadcasts a shutdown request to every probe worker of a tester.
///
/// Dropping the [`ShutdownTx`] is observed by the receivers as a shutdown request too, so
/// workers never outlive the handle that owns them.
#[derive(Debug, Clone)]
pub struct ShutdownTx(SignalTx);

impl ShutdownTx {
    pub fn wrap(tx: SignalTx) -> Self {
        Self(tx)
    }

    /// Requests shutdown.
    ///
    /// Fails only when every receiver is already gone, meaning there is nobody left to stop.
    pub fn shutdown(&self) -> Result<(), watch::error::SendError<()>> {
        self.0.send(())
    }
}

pub type ShutdownRx = SignalRx;

/// Polls `shutdown_rx` without waiting.
///
/// Returns `true` if shutdown was requested since the receiver last looked, or if the sender
/// was dropped.
pub fn shutdown_requested(shutdown_rx: &ShutdownRx) -> bool {
    match shutdown_rx.has_changed() {
        Ok(changed) => changed,
        Err(_) => {
            debug!("shutdown sender dropped, treating it as a shutdown request");

            true
        }
    }
}

pub fn create_shutdown_channel() -> (ShutdownTx, ShutdownRx) {
    let (tx, rx) = create_signal();
    (ShutdownTx::wrap(tx), rx)
}
