#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::Context;
use lazyrows_core::{ServerConfig, shutdown::shutdown_signal, telemetry};
use lazyrows_stream::{StreamSettings, StreamState, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load().context("Failed to load configuration")?;
    telemetry::init_tracing("info,lazyrows_stream=debug", config.log_format);

    tracing::info!(
        batch_size = config.stream.batch_size,
        slow_delay_ms = config.stream.slow_delay_ms,
        "Starting LazyRows streaming server"
    );

    let state = StreamState::new(StreamSettings::from(&config.stream));
    let app = router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("LazyRows streaming demo running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("LazyRows streaming server stopped");
    Ok(())
}
