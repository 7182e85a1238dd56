#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::Context;
use lazyrows_core::{ServerConfig, shutdown::shutdown_signal, telemetry};
use lazyrows_poll::{PollState, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load().context("Failed to load configuration")?;
    telemetry::init_tracing("info,lazyrows_poll=debug", config.log_format);

    tracing::info!(
        batch_size = config.poll.batch_size,
        min_delay_ms = config.poll.min_delay_ms,
        max_delay_ms = config.poll.max_delay_ms,
        "Starting LazyRows polling server"
    );

    let state = PollState::from_config(&config.poll).context("Invalid poll settings")?;
    let scheduler = state.scheduler.clone();
    let app = router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("LazyRows polling demo running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!(
        in_flight = scheduler.in_flight(),
        "Waiting for background computations"
    );
    scheduler.drain().await;
    tracing::info!("LazyRows polling server stopped");
    Ok(())
}
