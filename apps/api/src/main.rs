mod config;
mod errors;
mod llm_client;
mod planner;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::GroqClient;
use crate::planner::chain::LearningPlanChain;
use crate::planner::session::{SessionLimits, SessionStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing GROQ_API_KEY)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Planner API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = GroqClient::new(config.groq_api_key.clone(), config.groq_base_url.clone())?;
    info!("LLM client initialized (endpoint: {})", config.groq_base_url);

    // Parse prompt templates once; a malformed template is a startup failure
    let chain = LearningPlanChain::new(config.groq_model.clone())?;
    info!("Learning-plan chain ready (model: {})", chain.model());

    let sessions = SessionStore::new(SessionLimits {
        max_sessions: config.max_sessions,
        idle_ttl: Duration::from_secs(config.session_idle_ttl_secs),
    });
    info!(
        "Session store ready (max {} sessions, idle TTL {}s)",
        config.max_sessions, config.session_idle_ttl_secs
    );

    let state = AppState {
        llm: Arc::new(llm),
        chain: Arc::new(chain),
        sessions,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
