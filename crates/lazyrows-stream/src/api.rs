use crate::event::StreamEvent;
use crate::producer::{LogLifecycle, StreamLifecycle, StreamSettings, produce};
use crate::static_assets::{index_handler, static_handler};
use axum::{
    Router,
    extract::State,
    response::sse::{Event, Sse},
    routing::get,
};
use futures::{Stream, StreamExt};
use std::sync::Arc;

/// Shared state for the streaming handlers.
#[derive(Clone)]
pub struct StreamState {
    pub settings: StreamSettings,
    pub lifecycle: Arc<dyn StreamLifecycle>,
}

impl StreamState {
    pub fn new(settings: StreamSettings) -> Self {
        Self {
            settings,
            lifecycle: Arc::new(LogLifecycle),
        }
    }

    pub fn with_lifecycle(mut self, lifecycle: Arc<dyn StreamLifecycle>) -> Self {
        self.lifecycle = lifecycle;
        self
    }
}

pub fn router(state: StreamState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_check))
        .route("/stream", get(stream_rows))
        .route("/static/{*path}", get(static_handler))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

// GET /stream
async fn stream_rows(
    State(state): State<StreamState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let events = produce(state.settings.clone(), state.lifecycle.clone())
        .map(|event: StreamEvent| Event::try_from(event).map_err(axum::Error::new));
    Sse::new(events)
}
