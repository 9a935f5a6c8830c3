//! Answer composition: retrieval with a relevance gate, short-term context,
//! prompt assembly, and the completion call with its fixed fallback.

use std::sync::Arc;

use crate::config::Config;
use crate::embeddings::EmbeddingProvider;
use crate::error::Result;
use crate::index::EmbeddingIndex;
use crate::llm::{prompts, CompletionOptions, LlmProvider};
use crate::memory::MemoryStore;

pub struct ChatService {
    index: Arc<EmbeddingIndex>,
    embeddings: EmbeddingProvider,
    llm: LlmProvider,
    memory: MemoryStore,
    top_k: usize,
    score_threshold: f32,
    context_exchanges: usize,
    options: CompletionOptions,
}

impl ChatService {
    pub fn new(
        index: Arc<EmbeddingIndex>,
        embeddings: EmbeddingProvider,
        llm: LlmProvider,
        config: &Config,
    ) -> Self {
        Self {
            index,
            embeddings,
            llm,
            memory: MemoryStore::new(config.memory.max_exchanges),
            top_k: config.retrieval.top_k,
            score_threshold: config.retrieval.score_threshold,
            context_exchanges: config.memory.context_exchanges,
            options: CompletionOptions {
                temperature: Some(config.llm.temperature),
                max_tokens: Some(config.llm.max_tokens),
            },
        }
    }

    /// Answer one query within its conversation.
    ///
    /// The conversation's memory lock is held for the whole cycle, so
    /// concurrent requests for the same `conv_id` are serialized while
    /// other conversations proceed independently. A completion failure
    /// degrades to the fixed apology; an embedding failure propagates,
    /// since without a query vector there is nothing to degrade to.
    pub async fn answer(&self, query: &str, conv_id: &str) -> Result<String> {
        let memory = self.memory.get_or_create(conv_id).await;
        let mut memory = memory.lock().await;

        let query_vector = self.embeddings.embed_query(query).await?;
        let hits = self.index.search(&query_vector, self.top_k);
        let best_score = hits.first().map(|(_, score)| *score).unwrap_or(0.0);

        let prompt = if best_score < self.score_threshold {
            tracing::debug!(conv_id = %conv_id, best_score, "below relevance gate, escalating");
            prompts::escalation_prompt()
        } else {
            let reference = prompts::reference_block(&hits);
            let history = memory.recent_context(self.context_exchanges);
            prompts::answer_prompt(query, &reference, &history, prompts::is_detail_question(query))
        };

        let response = match self
            .llm
            .complete(&prompt, Some(prompts::SYSTEM_PROMPT), Some(&self.options))
            .await
        {
            Ok(text) => text.trim().to_string(),
            Err(error) => {
                tracing::warn!(conv_id = %conv_id, error = %error, "completion failed, using fallback reply");
                prompts::TECHNICAL_FALLBACK.to_string()
            }
        };

        memory.add_exchange(query, &response);
        Ok(response)
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }
}
