//! Streaming producer: fast rows, simulated slow work, slow rows, done.
//!
//! The producer owns a [`StreamReport`] through a scope guard. The guard is
//! created before the first event and handed to [`StreamLifecycle::closed`]
//! when the generator is dropped, which happens exactly once whether the
//! stream was drained, abandoned by the client mid-sleep, or unwound by a
//! panic.

use crate::event::{EventKind, StreamEvent};
use futures::Stream;
use lazyrows_core::batch::{computed_value, fixed_batch};
use lazyrows_core::{Row, RowId, SlowRow, StreamConfig};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct StreamSettings {
    pub batch_size: u32,
    pub slow_delay: Duration,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self::from(&StreamConfig::default())
    }
}

impl From<&StreamConfig> for StreamSettings {
    fn from(config: &StreamConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            slow_delay: config.slow_delay(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The consumer read past the `done` event.
    Completed,
    /// The stream was dropped before it finished.
    Abandoned,
}

/// What a single stream did before it closed.
#[derive(Debug, Clone)]
pub struct StreamReport {
    pub stream_id: Uuid,
    pub last_sent: Option<EventKind>,
    pub completed: bool,
    started_at: Instant,
}

impl StreamReport {
    fn new() -> Self {
        Self {
            stream_id: Uuid::new_v4(),
            last_sent: None,
            completed: false,
            started_at: Instant::now(),
        }
    }

    pub fn outcome(&self) -> StreamOutcome {
        if self.completed {
            StreamOutcome::Completed
        } else {
            StreamOutcome::Abandoned
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Finalization hook run once per stream.
pub trait StreamLifecycle: Send + Sync {
    fn closed(&self, report: &StreamReport);
}

/// Default lifecycle: logs the close.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLifecycle;

impl StreamLifecycle for LogLifecycle {
    fn closed(&self, report: &StreamReport) {
        info!(
            stream_id = %report.stream_id,
            outcome = ?report.outcome(),
            last_sent = report.last_sent.map(|kind| kind.as_str()).unwrap_or("none"),
            elapsed_ms = report.elapsed().as_millis() as u64,
            "Request process complete. Closing stream"
        );
    }
}

/// Builds the event sequence for one connection.
///
/// Nothing runs until the stream is first polled.
pub fn produce(
    settings: StreamSettings,
    lifecycle: Arc<dyn StreamLifecycle>,
) -> impl Stream<Item = StreamEvent> + Send + 'static {
    produce_with(settings, lifecycle, computed_value)
}

/// Like [`produce`], with `compute` supplying each row's slow column.
///
/// `compute` runs after the simulated delay. A panic inside it ends the
/// stream; the lifecycle still sees the close, with `fast` as the last event.
pub fn produce_with<F>(
    settings: StreamSettings,
    lifecycle: Arc<dyn StreamLifecycle>,
    compute: F,
) -> impl Stream<Item = StreamEvent> + Send + 'static
where
    F: Fn(RowId) -> String + Send + 'static,
{
    async_stream::stream! {
        let mut report = scopeguard::guard(StreamReport::new(), move |report| {
            lifecycle.closed(&report);
        });
        info!(stream_id = %report.stream_id, "Request received");

        let rows = fixed_batch(settings.batch_size);

        report.last_sent = Some(EventKind::Fast);
        yield StreamEvent::Fast(rows.iter().map(Row::fast).collect());
        debug!(stream_id = %report.stream_id, rows = rows.len(), "Sent fast attributes");

        tokio::time::sleep(settings.slow_delay).await;

        let slow_rows: Vec<SlowRow> = rows
            .into_iter()
            .map(|row| {
                let value = compute(row.id);
                row.with_slow_value(value)
            })
            .filter_map(|row| row.slow())
            .collect();
        debug!(stream_id = %report.stream_id, "Finished slow computation");

        report.last_sent = Some(EventKind::Slow);
        yield StreamEvent::Slow(slow_rows);
        debug!(stream_id = %report.stream_id, "Sent slow attributes");

        report.last_sent = Some(EventKind::Done);
        yield StreamEvent::Done;
        debug!(stream_id = %report.stream_id, "Sent done event");

        report.completed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingLifecycle {
        reports: Mutex<Vec<StreamReport>>,
    }

    impl RecordingLifecycle {
        fn reports(&self) -> Vec<StreamReport> {
            self.reports.lock().unwrap().clone()
        }
    }

    impl StreamLifecycle for RecordingLifecycle {
        fn closed(&self, report: &StreamReport) {
            self.reports.lock().unwrap().push(report.clone());
        }
    }

    fn settings(slow_delay: Duration) -> StreamSettings {
        StreamSettings {
            batch_size: 5,
            slow_delay,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_arrive_in_order() {
        let recorder = Arc::new(RecordingLifecycle::default());
        let events: Vec<StreamEvent> = produce(settings(Duration::from_secs(3)), recorder.clone())
            .collect()
            .await;

        let kinds: Vec<EventKind> = events.iter().map(StreamEvent::kind).collect();
        assert_eq!(kinds, vec![EventKind::Fast, EventKind::Slow, EventKind::Done]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_and_slow_ids_match() {
        let events: Vec<StreamEvent> =
            produce(settings(Duration::from_secs(3)), Arc::new(LogLifecycle))
                .collect()
                .await;

        let fast_ids: BTreeSet<u32> = match &events[0] {
            StreamEvent::Fast(rows) => rows.iter().map(|r| r.id).collect(),
            other => panic!("expected fast event, got {:?}", other),
        };
        let slow_ids: BTreeSet<u32> = match &events[1] {
            StreamEvent::Slow(rows) => {
                for row in rows {
                    assert_eq!(row.slow_value, format!("Computed-{}", row.id));
                }
                rows.iter().map(|r| r.id).collect()
            }
            other => panic!("expected slow event, got {:?}", other),
        };
        assert_eq!(fast_ids, (1..=5).collect());
        assert_eq!(fast_ids, slow_ids);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_event_waits_for_delay() {
        let delay = Duration::from_secs(3);
        let mut stream = Box::pin(produce(settings(delay), Arc::new(LogLifecycle)));

        let started = tokio::time::Instant::now();
        let first = stream.next().await.unwrap();
        assert_eq!(first.kind(), EventKind::Fast);
        assert!(started.elapsed() < delay);

        let second = stream.next().await.unwrap();
        assert_eq!(second.kind(), EventKind::Slow);
        assert!(started.elapsed() >= delay);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finalization_runs_once_on_completion() {
        let recorder = Arc::new(RecordingLifecycle::default());
        let mut stream = Box::pin(produce(settings(Duration::from_secs(3)), recorder.clone()));

        while stream.next().await.is_some() {}
        assert_eq!(recorder.reports().len(), 1);

        drop(stream);
        let reports = recorder.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcome(), StreamOutcome::Completed);
        assert_eq!(reports[0].last_sent, Some(EventKind::Done));
    }

    #[tokio::test]
    async fn test_finalization_runs_once_on_disconnect_after_fast() {
        let recorder = Arc::new(RecordingLifecycle::default());
        let mut stream = Box::pin(produce(settings(Duration::from_secs(3600)), recorder.clone()));

        let first = stream.next().await.unwrap();
        assert_eq!(first.kind(), EventKind::Fast);

        // Park the producer inside its slow-phase sleep, then hang up.
        let pending = tokio::time::timeout(Duration::from_millis(20), stream.next()).await;
        assert!(pending.is_err());
        assert!(recorder.reports().is_empty());

        drop(stream);
        let reports = recorder.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcome(), StreamOutcome::Abandoned);
        assert_eq!(reports[0].last_sent, Some(EventKind::Fast));
    }

    #[tokio::test]
    async fn test_finalization_runs_once_when_slow_computation_panics() {
        let recorder = Arc::new(RecordingLifecycle::default());
        let stream = produce_with(
            settings(Duration::from_millis(1)),
            recorder.clone(),
            |id| panic!("slow column for row {} failed", id),
        );

        let consumer = tokio::spawn(async move {
            let mut stream = Box::pin(stream);
            let mut kinds = Vec::new();
            while let Some(event) = stream.next().await {
                kinds.push(event.kind());
            }
            kinds
        });

        let err = consumer.await.unwrap_err();
        assert!(err.is_panic());

        let reports = recorder.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcome(), StreamOutcome::Abandoned);
        assert_eq!(reports[0].last_sent, Some(EventKind::Fast));
    }

    #[tokio::test]
    async fn test_custom_slow_column() {
        let events: Vec<StreamEvent> = produce_with(
            settings(Duration::from_millis(1)),
            Arc::new(LogLifecycle),
            |id| format!("Score-{}", id * 2),
        )
        .collect()
        .await;

        match &events[1] {
            StreamEvent::Slow(rows) => {
                assert_eq!(rows[0].slow_value, "Score-2");
                assert_eq!(rows[4].slow_value, "Score-10");
            }
            other => panic!("expected slow event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unpolled_stream_never_finalizes() {
        let recorder = Arc::new(RecordingLifecycle::default());
        let stream = produce(settings(Duration::from_secs(1)), recorder.clone());
        drop(stream);
        assert!(recorder.reports().is_empty());
    }
}
