use std::sync::Arc;

use crate::backend_client::RecruitingBackend;
use crate::board::BoardRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Recruiting backend. Default: `HttpBackend`; tests swap in an in-memory one.
    pub backend: Arc<dyn RecruitingBackend>,
    pub boards: BoardRegistry,
}
