use std::sync::Arc;

use crate::core::config::{AppConfig, AppPaths};
use crate::history::HistoryStore;
use crate::index::VectorIndex;
use crate::llm::{Embedder, Generator, OpenAiProvider};
use crate::rag::{AnswerOrchestrator, AssemblerConfig, ContextAssembler};

/// Everything the assistant needs for its process lifetime, constructed
/// once and shared by reference. The index and providers are loaded here
/// and never mutated afterwards.
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: AppConfig,
    pub index: Arc<VectorIndex>,
    pub history: HistoryStore,
    pub orchestrator: AnswerOrchestrator,
}

impl AppState {
    pub async fn initialize(paths: Arc<AppPaths>) -> anyhow::Result<Arc<Self>> {
        let config = AppConfig::load(&paths)?;

        let index = Arc::new(VectorIndex::load_or_empty(&paths.index_dir)?);
        tracing::info!(
            "corpus index: {} chunks, dimension {}",
            index.len(),
            index.dimension()
        );

        let provider = Arc::new(OpenAiProvider::new(&config));
        let embedder: Arc<dyn Embedder> = provider.clone();
        let generator: Arc<dyn Generator> = provider;

        let assembler =
            ContextAssembler::new(index.clone(), embedder, AssemblerConfig::from(&config));
        let orchestrator =
            AnswerOrchestrator::new(assembler, generator, config.max_answer_tokens);

        let history = HistoryStore::new(paths.db_path.clone()).await?;

        Ok(Arc::new(AppState {
            paths,
            config,
            index,
            history,
            orchestrator,
        }))
    }
}
