//! HTTP route definitions and server startup.

use std::sync::Arc;

use axum::{middleware, routing::get, routing::post, Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::auth::{self, SessionKeys};
use super::types::HealthResponse;
use super::{canvas, chat};
use crate::agent::Agent;
use crate::canvas_store::{create_canvas_store, SharedCanvasStore};
use crate::config::Config;
use crate::llm::{LlmClient, OpenRouterClient};
use crate::tools::ToolRegistry;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub agent: Agent,
    pub llm: Arc<dyn LlmClient>,
    pub canvases: SharedCanvasStore,
    pub sessions: SessionKeys,
}

impl AppState {
    /// Wire the agent and its tools around an LLM client and canvas store.
    pub fn new(
        config: Config,
        llm: Arc<dyn LlmClient>,
        canvases: SharedCanvasStore,
    ) -> anyhow::Result<Self> {
        let tools = ToolRegistry::standard(Arc::clone(&llm), Arc::clone(&canvases), &config.search_url)?;
        tracing::info!(tools = ?tools.names(), "Tool registry ready");
        let agent = Agent::new(Arc::clone(&llm), tools);
        let sessions = SessionKeys::new(&config.auth.secret);

        Ok(Self {
            config,
            agent,
            llm,
            canvases,
            sessions,
        })
    }
}

/// Build the production state: OpenRouter client plus the configured canvas store.
pub fn build_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let llm: Arc<dyn LlmClient> = Arc::new(OpenRouterClient::new(
        config.api_key.clone(),
        config.openrouter_base_url.as_str(),
    )?);
    let canvases = create_canvas_store(&config)?;
    Ok(Arc::new(AppState::new(config, llm, canvases)?))
}

/// All routes, with the session gate applied to `/api/admin`.
pub fn router(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .route("/ai-agent-chat", post(chat::agent_chat))
        .route("/ai-agent-chat/models", get(chat::list_models))
        .route("/ai-agent-chat/image", post(chat::generate_image))
        .route("/canvases", get(canvas::list_canvases))
        .route("/canvases/:id", get(canvas::get_canvas))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_admin,
        ));

    Router::new()
        .route("/api/health", get(health))
        .nest("/api/admin", admin)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    config.check_dev_secret()?;
    let addr = format!("{}:{}", config.host, config.port);
    let state = build_state(config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
