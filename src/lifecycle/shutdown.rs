//! Shutdown coordination between listeners.

use tokio::sync::broadcast;

/// Broadcasts a single stop signal to every running listener.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal every subscriber. Listeners stop accepting and drain.
    pub fn trigger(&self) {
        let receivers = self.tx.send(()).unwrap_or(0);
        tracing::info!(listeners = receivers, "Shutdown triggered");
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve once `rx` fires or its sender is gone.
pub async fn wait(mut rx: broadcast::Receiver<()>) {
    let _ = rx.recv().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_reaches_all_subscribers() {
        let shutdown = Shutdown::new();
        let a = shutdown.subscribe();
        let b = shutdown.subscribe();
        assert_eq!(shutdown.receiver_count(), 2);

        shutdown.trigger();
        wait(a).await;
        wait(b).await;
    }

    #[tokio::test]
    async fn test_dropped_sender_releases_waiters() {
        let shutdown = Shutdown::new();
        let rx = shutdown.subscribe();
        drop(shutdown);
        wait(rx).await;
    }
}
