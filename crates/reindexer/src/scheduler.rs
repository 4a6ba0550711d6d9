use crate::coordinator::ReindexCoordinator;
use crate::error::{ReindexerError, Result};
use crate::stats::CoordinatorHealth;
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time;

/// Tick intervals for the background loop.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How often queued changes are drained into the index.
    pub drain_interval: Duration,
    /// How often scheduled full reindexes are worked through.
    pub pending_reindex_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            drain_interval: Duration::from_secs(10),
            pending_reindex_interval: Duration::from_secs(30),
        }
    }
}

enum SchedulerCommand {
    DrainNow,
    Shutdown,
}

/// Periodic driver for the coordinator: one interval drains the change
/// queue, another works through scheduled full reindexes. Both ticks call
/// non-blocking coordinator entry points, so a long-running reindex never
/// stalls the loop.
#[derive(Clone)]
pub struct DrainScheduler {
    inner: Arc<DrainSchedulerInner>,
}

struct DrainSchedulerInner {
    command_tx: mpsc::Sender<SchedulerCommand>,
    health_tx: watch::Sender<CoordinatorHealth>,
}

impl DrainScheduler {
    pub fn start(coordinator: Arc<ReindexCoordinator>, config: SchedulerConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (health_tx, _) = watch::channel(CoordinatorHealth::default());

        spawn_tick_loop(coordinator, config, command_rx, health_tx.clone());

        Self {
            inner: Arc::new(DrainSchedulerInner {
                command_tx,
                health_tx,
            }),
        }
    }

    /// Drain the queue now instead of waiting for the next tick.
    pub async fn drain_now(&self) -> Result<()> {
        self.inner
            .command_tx
            .send(SchedulerCommand::DrainNow)
            .await
            .map_err(|e| ReindexerError::Other(format!("failed to send drain command: {e}")))
    }

    pub async fn shutdown(&self) {
        let _ = self.inner.command_tx.send(SchedulerCommand::Shutdown).await;
    }

    #[must_use]
    pub fn health_snapshot(&self) -> CoordinatorHealth {
        self.inner.health_tx.subscribe().borrow().clone()
    }

    #[must_use]
    pub fn health_stream(&self) -> watch::Receiver<CoordinatorHealth> {
        self.inner.health_tx.subscribe()
    }
}

impl Drop for DrainScheduler {
    fn drop(&mut self) {
        if Arc::strong_count(&self.inner) == 1 {
            let _ = self.inner.command_tx.try_send(SchedulerCommand::Shutdown);
        }
    }
}

fn spawn_tick_loop(
    coordinator: Arc<ReindexCoordinator>,
    config: SchedulerConfig,
    mut command_rx: mpsc::Receiver<SchedulerCommand>,
    health_tx: watch::Sender<CoordinatorHealth>,
) {
    tokio::spawn(async move {
        // First tick after one full interval; interval() would fire
        // immediately on startup.
        let mut drain_tick = time::interval_at(
            time::Instant::now() + config.drain_interval,
            config.drain_interval,
        );
        let mut pending_tick = time::interval_at(
            time::Instant::now() + config.pending_reindex_interval,
            config.pending_reindex_interval,
        );
        drain_tick.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        pending_tick.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = drain_tick.tick() => {
                    match coordinator.process_queue().await {
                        Ok(applied) if applied > 0 => {
                            info!("Drain tick applied {applied} queued changes");
                        }
                        Ok(_) => {}
                        Err(e) => error!("Drain tick failed: {e}"),
                    }
                    let _ = health_tx.send(coordinator.health().await);
                }
                _ = pending_tick.tick() => {
                    match coordinator.process_next_reindexing_batch().await {
                        Ok(done) => {
                            for (entity_type, outcome) in &done {
                                info!("Scheduled reindex of {entity_type} finished: {outcome:?}");
                            }
                        }
                        Err(e) => error!("Scheduled reindex tick failed: {e}"),
                    }
                    let _ = health_tx.send(coordinator.health().await);
                }
                Some(command) = command_rx.recv() => {
                    match command {
                        SchedulerCommand::DrainNow => {
                            match coordinator.process_queue().await {
                                Ok(applied) => {
                                    info!("Manual drain applied {applied} queued changes");
                                }
                                Err(e) => warn!("Manual drain failed: {e}"),
                            }
                            let _ = health_tx.send(coordinator.health().await);
                        }
                        SchedulerCommand::Shutdown => break,
                    }
                }
                else => break,
            }
        }
    });
}
