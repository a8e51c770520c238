use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionModel;
use crate::planner::chain::LearningPlanChain;
use crate::planner::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable completion backend. Default: GroqClient.
    pub llm: Arc<dyn CompletionModel>,
    /// Parsed prompt templates and the model identifier they are sent to.
    pub chain: Arc<LearningPlanChain>,
    pub sessions: SessionStore,
    pub config: Config,
}
