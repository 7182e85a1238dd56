use crate::scheduler::SlowValueScheduler;
use crate::store::SlowResultStore;
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use lazyrows_core::batch::random_batch;
use lazyrows_core::{ConfigError, PollConfig, Row, RowId, SlowValueResponse};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared state for the polling handlers.
#[derive(Debug, Clone)]
pub struct PollState {
    pub scheduler: SlowValueScheduler,
    pub batch_size: u32,
}

impl PollState {
    pub fn new(scheduler: SlowValueScheduler, batch_size: u32) -> Self {
        Self {
            scheduler,
            batch_size,
        }
    }

    pub fn from_config(config: &PollConfig) -> Result<Self, ConfigError> {
        let scheduler = SlowValueScheduler::from_config(SlowResultStore::new(), config)?;
        Ok(Self::new(scheduler, config.batch_size))
    }
}

pub fn router(state: PollState) -> Router {
    // The table page is opened from anywhere, including file:// URLs.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/rows", get(get_rows))
        .route("/slow-value/{row_id}", get(get_slow_value))
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

// GET /rows
async fn get_rows(State(state): State<PollState>) -> Json<Vec<Row>> {
    let rows = random_batch(state.batch_size, &mut rand::rng());
    state.scheduler.schedule_batch(&rows);
    info!(rows = rows.len(), "Returned fast columns");
    Json(rows)
}

// GET /slow-value/{row_id}
async fn get_slow_value(
    State(state): State<PollState>,
    Path(row_id): Path<i64>,
) -> Json<SlowValueResponse> {
    // Unknown, never-scheduled and still-computing ids all read as null.
    let slow_value = RowId::try_from(row_id)
        .ok()
        .and_then(|id| state.scheduler.store().get(id));

    Json(SlowValueResponse {
        id: row_id,
        slow_value,
    })
}
