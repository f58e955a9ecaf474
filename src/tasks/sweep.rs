//! Eviction Sweep Task
//!
//! Background task that periodically removes entries past their grace period.

use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Something the sweep task can purge.
pub trait Sweepable: Send + Sync + 'static {
    /// Removes every entry that is evictable at `now`.
    ///
    /// Returns the number removed, or `None` once the owner has shut down and
    /// the task should exit.
    fn sweep_evictable(&self, now: Instant) -> Option<usize>;
}

/// Handle to a running sweep task.
///
/// Dropping the handle stops the task.
#[derive(Debug)]
pub struct SweepHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweepHandle {
    /// Signals the task to stop and aborts it.
    ///
    /// Calling this more than once is harmless.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        self.task.abort();
    }

    /// Returns true once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawns a task on `runtime` that sweeps `target` every `period`.
///
/// The task holds only a `Weak` to its target and exits on its own if the
/// target is gone. The first sweep runs one full `period` after spawning.
/// A `period` too large for the clock never fires; the task then only waits
/// for shutdown.
///
/// `period` must be non-zero.
///
/// # Example
/// ```ignore
/// let store = Arc::new(EntryStore::new(expiration, grace));
/// let handle = spawn_sweep_task(Arc::downgrade(&store), Duration::from_secs(60), &Handle::current());
/// // Later, during teardown:
/// handle.stop();
/// ```
pub fn spawn_sweep_task<S: Sweepable>(
    target: Weak<S>,
    period: Duration,
    runtime: &Handle,
) -> SweepHandle {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = runtime.spawn(sweep_loop(target, period, shutdown_rx));

    info!(period = ?period, "Eviction sweep task started");

    SweepHandle { shutdown_tx, task }
}

async fn sweep_loop<S: Sweepable>(
    target: Weak<S>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let Some(first_tick) = Instant::now().checked_add(period) else {
        debug!(period = ?period, "Eviction sweep period beyond clock range, never sweeping");
        let _ = shutdown_rx.wait_for(|stop| *stop).await;
        info!("Eviction sweep task stopped");
        return;
    };

    let mut ticker = interval_at(first_tick, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Eviction sweep received shutdown signal");
                    break;
                }
            }
            _ = ticker.tick() => {}
        }

        let Some(target) = target.upgrade() else {
            debug!("Eviction sweep target dropped");
            break;
        };

        match target.sweep_evictable(Instant::now()) {
            Some(removed) if removed > 0 => {
                info!("Eviction sweep: removed {} entries past grace", removed);
            }
            Some(_) => debug!("Eviction sweep: nothing to remove"),
            None => break,
        }
    }

    info!("Eviction sweep task stopped");
}
