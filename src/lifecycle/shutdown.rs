//! Shutdown coordination for the relay.
//!
//! The HTTP server drains when either an OS signal arrives or
//! [`Shutdown::trigger`] is called (tests and embedding callers).

use tokio::sync::broadcast;

use crate::lifecycle::signals::shutdown_signal;

/// Broadcast coordinator for graceful shutdown.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A receiver that fires on [`Shutdown::trigger`].
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Ask every subscriber to stop. A no-op when nobody is listening.
    pub fn trigger(&self) {
        if self.tx.send(()).is_err() {
            tracing::debug!("Shutdown triggered with no subscribers");
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve on the first of an OS shutdown signal or a triggered receiver.
///
/// A closed channel (coordinator dropped) counts as a trigger.
pub async fn shutdown_requested(mut rx: broadcast::Receiver<()>) {
    tokio::select! {
        _ = shutdown_signal() => {}
        _ = rx.recv() => {
            tracing::info!("Shutdown requested");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_reaches_subscribers() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();

        shutdown.trigger();
        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_requested_resolves_on_trigger() {
        let shutdown = Shutdown::new();
        let waiter = tokio::spawn(shutdown_requested(shutdown.subscribe()));

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("shutdown not observed")
            .unwrap();
    }

    #[tokio::test]
    async fn test_dropped_coordinator_counts_as_trigger() {
        let shutdown = Shutdown::new();
        let rx = shutdown.subscribe();
        drop(shutdown);

        tokio::time::timeout(Duration::from_secs(1), shutdown_requested(rx))
            .await
            .expect("closed channel not observed");
    }

    #[test]
    fn test_trigger_without_subscribers() {
        Shutdown::default().trigger();
    }
}
