use std::sync::Arc;

use crate::config::Config;
use crate::embeddings::EmbeddingProvider;
use crate::index::EmbeddingIndex;
use crate::llm::LlmProvider;
use crate::services::ChatService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub index: Arc<EmbeddingIndex>,
    pub chat: Arc<ChatService>,
}

impl AppState {
    pub fn new(
        config: Config,
        index: EmbeddingIndex,
        embeddings: EmbeddingProvider,
        llm: LlmProvider,
    ) -> Self {
        let config = Arc::new(config);
        let index = Arc::new(index);
        let chat = Arc::new(ChatService::new(
            index.clone(),
            embeddings,
            llm,
            &config,
        ));

        Self {
            config,
            index,
            chat,
        }
    }
}
