//! Coordinated shutdown: a watch channel every loop listens on, plus a
//! bounded join so a stuck in-flight call cannot hang process exit.

use std::time::Duration;

use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::warn;

pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Completes once shutdown has been triggered. A dropped sender counts
    /// as shutdown.
    pub async fn recv(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Join task handles, giving up after `limit`. Remaining tasks are abandoned
/// and torn down with the process.
pub async fn join_within(handles: Vec<JoinHandle<()>>, limit: Duration) {
    if timeout(limit, join_all(handles)).await.is_err() {
        warn!("shutdown join timed out, abandoning remaining tasks");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listener_wakes_promptly_after_trigger() {
        let shutdown = Shutdown::new();
        let mut listener = shutdown.subscribe();
        let waiter = tokio::spawn(async move { listener.recv().await });
        shutdown.trigger();
        timeout(Duration::from_secs(1), waiter)
            .await
            .expect("listener did not wake within a second")
            .unwrap();
    }

    #[tokio::test]
    async fn trigger_before_subscribe_is_still_observed() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        let mut listener = shutdown.subscribe();
        timeout(Duration::from_millis(100), listener.recv())
            .await
            .expect("pre-triggered shutdown not observed");
    }

    #[tokio::test]
    async fn join_within_returns_despite_a_stuck_task() {
        let stuck = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });
        join_within(vec![stuck], Duration::from_millis(50)).await;
    }
}
