use crate::store::SlowResultStore;
use lazyrows_core::batch::slow_value;
use lazyrows_core::{ConfigError, PollConfig, Row, RowId};
use rand::RngExt;
use std::time::Duration;
use tokio_util::task::TaskTracker;
use tracing::debug;

/// Runs slow-column computations in the background and records their results.
///
/// Spawned tasks are detached from the request that scheduled them and are
/// not cancelled when the client goes away. They are tracked so shutdown and
/// tests can wait for every pending computation with [`drain`](Self::drain).
#[derive(Debug, Clone)]
pub struct SlowValueScheduler {
    store: SlowResultStore,
    min_delay_ms: u64,
    max_delay_ms: u64,
    tracker: TaskTracker,
}

impl SlowValueScheduler {
    /// Fails with [`ConfigError::InvertedDelayRange`] when `min_delay > max_delay`.
    pub fn new(
        store: SlowResultStore,
        min_delay: Duration,
        max_delay: Duration,
    ) -> Result<Self, ConfigError> {
        let min_delay_ms = saturating_millis(min_delay);
        let max_delay_ms = saturating_millis(max_delay);
        if min_delay_ms > max_delay_ms {
            return Err(ConfigError::InvertedDelayRange {
                min_ms: min_delay_ms,
                max_ms: max_delay_ms,
            });
        }

        Ok(Self {
            store,
            min_delay_ms,
            max_delay_ms,
            tracker: TaskTracker::new(),
        })
    }

    pub fn from_config(store: SlowResultStore, config: &PollConfig) -> Result<Self, ConfigError> {
        Self::new(store, config.min_delay(), config.max_delay())
    }

    pub fn store(&self) -> &SlowResultStore {
        &self.store
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Spawns the computation for `id` and returns the delay it will take.
    pub fn schedule(&self, id: RowId) -> Duration {
        let delay = self.pick_delay();
        let store = self.store.clone();

        self.tracker.spawn(async move {
            tokio::time::sleep(delay).await;
            store.insert(id, slow_value(id));
            debug!(row_id = id, delay_ms = saturating_millis(delay), "Slow value ready");
        });

        delay
    }

    pub fn schedule_batch(&self, rows: &[Row]) {
        for row in rows {
            self.schedule(row.id);
        }
        debug!(rows = rows.len(), in_flight = self.in_flight(), "Scheduled slow values");
    }

    /// Number of computations that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Waits for every scheduled computation to finish.
    ///
    /// The scheduler keeps accepting work afterwards.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    fn pick_delay(&self) -> Duration {
        let millis = rand::rng().random_range(self.min_delay_ms..=self.max_delay_ms);
        Duration::from_millis(millis)
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
