//! Background expiry sweeper.
//!
//! Server-side replacement for the per-view countdown timers: a single
//! fixed-interval task settles overdue OPEN wagers as lost. The handle owns
//! the task and is responsible for stopping it when the server shuts down.

use crate::domain::TimeMs;
use crate::service::WagerService;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub struct ExpirySweeper {
    service: Arc<WagerService>,
    interval: Duration,
}

/// Stop contract for a running sweeper.
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the sweep loop to exit and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

impl ExpirySweeper {
    pub fn new(service: Arc<WagerService>, interval: Duration) -> Self {
        Self { service, interval }
    }

    /// Spawn the fixed-interval sweep loop.
    pub fn start(self) -> SweeperHandle {
        let (shutdown, mut stopped) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            // The first tick fires immediately.
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        Self::sweep_once(&self.service).await;
                    }
                    _ = stopped.changed() => {
                        info!("Expiry sweeper stopped");
                        return;
                    }
                }
            }
        });

        SweeperHandle { shutdown, task }
    }

    /// Run a single sweep; errors are logged and the loop keeps going.
    pub async fn sweep_once(service: &WagerService) {
        match service.settle_expired(TimeMs::now()).await {
            Ok(0) => {}
            Ok(n) => info!(settled = n, "Expiry sweep settled overdue wagers"),
            Err(e) => error!(error = %e, "Expiry sweep failed"),
        }
    }
}
