//! Fan-out of plot notifications to connected browsers.

use explorer_common::ImageAvailable;
use tokio::sync::broadcast;
use tracing::debug;

/// Buffered events per subscriber before it starts lagging.
const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct NotificationHub {
    tx: broadcast::Sender<ImageAvailable>,
}

impl NotificationHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Send an event to every connected client. Returns how many received it.
    pub fn publish(&self, event: ImageAvailable) -> usize {
        match self.tx.send(event) {
            Ok(n) => n,
            Err(_) => {
                debug!("No clients connected, dropping image notification");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ImageAvailable> {
        self.tx.subscribe()
    }

    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}
