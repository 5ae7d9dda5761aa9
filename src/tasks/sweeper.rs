//! TTL Sweep Task
//!
//! Background task that periodically runs a sweep until told to stop.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};

// == Sweeper Handle ==
/// Owns a running sweep task.
///
/// Dropping the handle closes the stop channel, which ends the task before its
/// next tick. [`stop`](Self::stop) does the same and also waits for it.
#[derive(Debug)]
pub struct SweeperHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the task to exit and waits until it has finished.
    ///
    /// Must not be called again once it has returned. If the returned future
    /// is dropped early, calling it again resumes the wait.
    pub async fn stop(&mut self) {
        // Err means the task already ended and dropped its receiver
        let _ = self.stop_tx.send(true);

        if let Err(err) = (&mut self.task).await {
            if err.is_panic() {
                warn!("TTL sweeper panicked before shutdown: {}", err);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns a task on `runtime` that calls `sweep` every `period`.
///
/// The first sweep runs one full period after spawning. The loop ends when the
/// handle is stopped or dropped. A pending stop always wins over a due tick.
///
/// `period` must be non-zero. A period too large for the clock to represent
/// never ticks.
///
/// # Example
/// ```ignore
/// let mut handle = spawn_sweeper(&Handle::current(), Duration::from_secs(1), || {
///     cache.remove_expired();
/// });
/// // Later, during shutdown:
/// handle.stop().await;
/// ```
pub fn spawn_sweeper<F>(runtime: &Handle, period: Duration, mut sweep: F) -> SweeperHandle
where
    F: FnMut() + Send + 'static,
{
    let (stop_tx, mut stop_rx) = watch::channel(false);

    let task = runtime.spawn(async move {
        let Some(first_tick) = Instant::now().checked_add(period) else {
            warn!(?period, "TTL sweep period overflows the clock; sweeper not started");
            return;
        };

        info!(?period, "Starting TTL sweeper");

        let mut ticker = time::interval_at(first_tick, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                // Fires on an explicit stop and when the handle is dropped
                _ = stop_rx.changed() => break,

                _ = ticker.tick() => sweep(),
            }
        }

        info!("TTL sweeper stopped");
    });

    SweeperHandle { stop_tx, task }
}
