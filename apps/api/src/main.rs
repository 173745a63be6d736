mod auth;
mod config;
mod db;
mod document;
mod errors;
mod history;
mod llm_client;
mod models;
mod optimize;
mod routes;
mod state;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::{FirebaseIdentityVerifier, IdentityVerifier};
use crate::config::Config;
use crate::db::create_pool;
use crate::history::{HistoryStore, PgHistoryStore};
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Optimizer API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let model = GeminiClient::new(config.gemini_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Identity verification is optional; without it every request is anonymous
    let identity: Option<Arc<dyn IdentityVerifier>> = match &config.firebase_api_key {
        Some(key) => {
            info!("Firebase identity verification enabled");
            Some(Arc::new(FirebaseIdentityVerifier::new(key.clone())?))
        }
        None => {
            warn!("FIREBASE_API_KEY not set; bearer tokens will be ignored");
            None
        }
    };

    // Evaluation history is optional
    let history: Option<Arc<dyn HistoryStore>> = match &config.database_url {
        Some(url) => Some(Arc::new(PgHistoryStore::new(create_pool(url).await?))),
        None => {
            warn!("DATABASE_URL not set; evaluation history disabled");
            None
        }
    };

    let state = AppState {
        model: Arc::new(model),
        identity,
        history,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
