use std::sync::Arc;

use crate::config::Config;
use crate::credentials::CredentialChain;
use crate::keywords::KeywordRanker;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// Configured key sources (secrets store, environment). Handlers append the
    /// user's own entry per request.
    pub credentials: CredentialChain,
    pub ranker: Arc<KeywordRanker>,
    pub config: Config,
}
