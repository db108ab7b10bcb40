//! Shared application state for the web server.

use crate::feed::TelemetryFetcher;
use crate::llm::AnalysisGateway;
use std::path::PathBuf;
use std::sync::Arc;

/// State injected into every handler.
pub struct AppState {
    pub fetcher: Arc<TelemetryFetcher>,
    pub gateway: Arc<AnalysisGateway>,
    /// Directory served for `/` and static assets.
    pub static_dir: PathBuf,
}

pub type SharedState = Arc<AppState>;
