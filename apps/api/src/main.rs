mod config;
mod credentials;
mod errors;
mod extraction;
mod keywords;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::credentials::CredentialChain;
use crate::keywords::{KeywordRanker, StopwordSet};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JD keyword extractor v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::from_config(&config)?;
    info!("LLM client initialized (model: {})", llm.model());

    // Credential sources: secrets store, then environment; user entry is per request
    let credentials = CredentialChain::from_config(&config);
    match credentials.resolve() {
        Ok(credential) => info!("API key available from {}", credential.source),
        Err(e) => warn!("{e}; requests must supply a key or rely on frequency ranking"),
    }

    // Initialize frequency ranker
    let mut stopwords = StopwordSet::english();
    stopwords.extend(&config.extra_stopwords);
    info!(
        "Keyword ranker initialized ({} stopwords, top_n={}, fallback={})",
        stopwords.len(),
        config.default_top_n,
        config.frequency_fallback
    );
    let ranker = Arc::new(KeywordRanker::new(stopwords, config.default_top_n));

    // Build app state
    let state = AppState {
        llm,
        credentials,
        ranker,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
