use std::sync::Arc;

use crate::analysis_client::AnalysisService;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Remote analysis service. Default: `AnalysisClient` over HTTP.
    pub analysis: Arc<dyn AnalysisService>,
    pub config: Config,
}
