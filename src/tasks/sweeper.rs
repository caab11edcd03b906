//! Expiry Sweeper Task
//!
//! Background task that periodically removes expired cache entries.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;

// == Sweeper Handle ==
/// Owner-side handle of a running expiry sweeper.
///
/// Dropping the handle signals the task to stop without waiting for it.
#[derive(Debug)]
pub struct Sweeper {
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    // == Stop ==
    /// Stops the sweeper and waits for the task to finish.
    ///
    /// Once this returns no sweep is in progress and none will start.
    /// Calling it again is a no-op.
    pub async fn stop(&mut self) {
        // Fails only once the task has exited and dropped its receiver
        self.shutdown_tx.send(true).ok();

        let Some(handle) = self.handle.take() else {
            return;
        };
        match handle.await {
            Ok(()) => debug!("Expiry sweeper joined"),
            Err(err) => warn!(error = %err, "Expiry sweeper ended abnormally"),
        }
    }

    /// Returns true while the background task is alive.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.shutdown_tx.send(true).ok();
    }
}

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The first sweep runs one full `interval` after spawning. Each sweep takes
/// the write lock on the store for the duration of one full scan.
///
/// # Panics
/// Panics if called outside of a Tokio runtime.
///
/// # Example
/// ```ignore
/// let store = Arc::new(RwLock::new(CacheStore::new(&CacheConfig::default())));
/// let mut sweeper = spawn_sweeper(store.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// sweeper.stop().await;
/// ```
pub fn spawn_sweeper<K, V>(store: Arc<RwLock<CacheStore<K, V>>>, interval: Duration) -> Sweeper
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(run_sweeps(store, interval, shutdown_rx));

    Sweeper {
        shutdown_tx,
        handle: Some(handle),
    }
}

async fn run_sweeps<K, V>(
    store: Arc<RwLock<CacheStore<K, V>>>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    K: Hash + Eq + Clone,
    V: Clone,
{
    info!(?interval, "Starting expiry sweeper");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;

            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                let removed = {
                    let mut guard = store.write().await;
                    // Stop may have been requested while waiting for the lock
                    if *shutdown_rx.borrow() {
                        break;
                    }
                    guard.cleanup_expired()
                };

                if removed > 0 {
                    info!("Expiry sweep: removed {} expired entries", removed);
                } else {
                    debug!("Expiry sweep: no expired entries found");
                }
            }
        }
    }

    info!("Expiry sweeper stopped");
}
