use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resume_agent::api::{create_router, AppState, SessionRegistry};
use resume_agent::application::{
    ChatService, IngestService, InsightsService, QueryCondenser, RetrievalService,
};
use resume_agent::domain::ports::{FragmentIndex, FragmentSearch, ScopeIndex};
use resume_agent::infrastructure::{
    Config, InMemoryFragmentStore, MistralCompletion, QdrantFragmentStore, TextEmbedding,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=debug,resume_agent=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Arc::new(Config::load()?);

    let backend = std::env::var("SEARCH_BACKEND").unwrap_or_else(|_| "qdrant".into());
    let (scope, search, index, backend_label): (
        Arc<dyn ScopeIndex>,
        Arc<dyn FragmentSearch>,
        Arc<dyn FragmentIndex>,
        &'static str,
    ) = if backend == "memory" {
        let store = Arc::new(InMemoryFragmentStore::new());
        (store.clone(), store.clone(), store, "memory")
    } else {
        let embedding = Arc::new(TextEmbedding::from_config(&config.embedding));
        let store = Arc::new(
            QdrantFragmentStore::new(&config.qdrant.url, &config.qdrant.collection, embedding)
                .await?,
        );
        (store.clone(), store.clone(), store, "qdrant")
    };
    info!(backend = backend_label, "fragment store initialized");

    let completion = Arc::new(MistralCompletion::new());
    let retrieval = Arc::new(RetrievalService::new(
        scope.clone(),
        search,
        config.retrieval.top_k,
    ));
    let condenser = QueryCondenser::new(completion.clone(), config.llm.search_model.clone());

    let chat = Arc::new(ChatService::new(
        condenser,
        retrieval.clone(),
        completion.clone(),
        config.llm.response_model.clone(),
        Duration::from_secs(config.llm.timeout_seconds),
    ));
    let ingest = Arc::new(IngestService::new(index, config.retrieval.chunk_size));
    let insights = Arc::new(InsightsService::new(
        scope,
        retrieval,
        completion,
        config.llm.response_model.clone(),
    ));

    let sessions = Arc::new(SessionRegistry::new(config.retrieval.slide_window));
    let state = AppState::new(sessions, chat, ingest, insights, config.clone(), backend_label);
    let app = create_router(state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
