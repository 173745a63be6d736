use std::sync::Arc;

use crate::auth::IdentityVerifier;
use crate::config::Config;
use crate::history::HistoryStore;
use crate::llm_client::GenerativeModel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn GenerativeModel>,
    /// `None` when FIREBASE_API_KEY is unset; every request is then anonymous.
    pub identity: Option<Arc<dyn IdentityVerifier>>,
    /// `None` when DATABASE_URL is unset; evaluations are not recorded.
    pub history: Option<Arc<dyn HistoryStore>>,
    pub config: Config,
}
