//! Background refresh for watch mode
//!
//! Periodically asks the `StatsService` for hook stats on a tokio task and
//! sends the results to the main loop over a channel. Ticks inside the cache
//! TTL are answered from memory.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::data::{Snapshot, StatsService, StatsSource};

/// Messages sent from the background refresh to the main loop
#[derive(Debug, Clone)]
pub enum RefreshMessage {
    /// A snapshot is available (fresh or cached)
    Updated(Snapshot),
    /// The refresh failed; the loop keeps running
    RefreshError(String),
}

/// Handle for controlling the background refresh task
pub struct RefreshHandle {
    /// Channel for receiving refresh messages
    pub receiver: mpsc::Receiver<RefreshMessage>,
    /// Flag to signal shutdown
    shutdown_tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Spawns a task that refreshes every `interval`, starting immediately
    pub fn spawn<S>(service: Arc<StatsService<S>>, interval: Duration) -> Self
    where
        S: StatsSource + Send + Sync + 'static,
    {
        let (msg_tx, msg_rx) = mpsc::channel(8);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let message = match service.hook_infos().await {
                            Ok(snapshot) => RefreshMessage::Updated(snapshot),
                            Err(e) => {
                                tracing::warn!("refresh failed: {}", e);
                                RefreshMessage::RefreshError(e.to_string())
                            }
                        };

                        if msg_tx.send(message).await.is_err() {
                            break;
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            receiver: msg_rx,
            shutdown_tx,
        }
    }

    /// Shuts down the background refresh task
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}
