use anyhow::Context;

use defgen::api::create_router;
use defgen::config::Config;
use defgen::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber (also picks up log crate records)
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    let state = AppState::from_config(&config).context("Failed to build pipeline")?;
    tracing::info!(
        mode = ?config.mode,
        direct_answer = state.pipeline.direct_answer_name().unwrap_or("none"),
        selector = state.pipeline.selector_name(),
        summarizer = state.pipeline.summarizer_name().unwrap_or("none"),
        scope_filter = config.scope_filter,
        "pipeline ready"
    );

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
