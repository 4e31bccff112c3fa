//! Admin Agent - HTTP Server Entry Point
//!
//! Starts the HTTP server that exposes the assistant API.

use admin_agent::{api, config::Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "admin_agent=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Loaded configuration: llm={}, persistent_canvases={}",
        config.openrouter_base_url,
        config.database_path.is_some()
    );

    api::serve(config).await?;

    Ok(())
}
