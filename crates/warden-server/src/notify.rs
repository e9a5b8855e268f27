//! Notification side-channel.
//!
//! Free-form messages go onto a bounded queue drained by a listener task that
//! only logs them. A full queue drops the message; nothing here touches
//! enforcer state.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Producer side, cheap to clone.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<String>,
}

impl Notifier {
    /// Spawn the listener and return the producer handle with it.
    pub fn spawn(capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, tokio::spawn(listen(rx)))
    }

    /// Returns false when the message was dropped.
    pub fn notify(&self, say: String) -> bool {
        match self.tx.try_send(say) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                warn!(len = dropped.len(), "notification queue full, message dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("notification listener gone, message dropped");
                false
            }
        }
    }
}

async fn listen(mut rx: mpsc::Receiver<String>) {
    while let Some(say) = rx.recv().await {
        info!(%say, "notification received");
    }
}
