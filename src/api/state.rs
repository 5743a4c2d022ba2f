use std::sync::Arc;

use crate::api::sessions::SessionRegistry;
use crate::application::{ChatService, IngestService, InsightsService};
use crate::infrastructure::Config;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
    pub chat: Arc<ChatService>,
    pub ingest: Arc<IngestService>,
    pub insights: Arc<InsightsService>,
    pub config: Arc<Config>,
    pub search_backend: &'static str,
}

impl AppState {
    pub fn new(
        sessions: Arc<SessionRegistry>,
        chat: Arc<ChatService>,
        ingest: Arc<IngestService>,
        insights: Arc<InsightsService>,
        config: Arc<Config>,
        search_backend: &'static str,
    ) -> Self {
        Self {
            sessions,
            chat,
            ingest,
            insights,
            config,
            search_backend,
        }
    }
}
