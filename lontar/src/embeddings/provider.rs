//! Facade over the remote embedding collaborator. The service never looks
//! inside a vector; it only needs query embedding and order-preserving
//! batch embedding for ingestion.

use crate::config::{parse_provider_model, EmbeddingsConfig};
use crate::embeddings::api::{default_base_url, ApiConfig, EmbeddingApiClient};
use crate::error::{LontarError, Result};

#[derive(Clone)]
pub struct EmbeddingProvider {
    client: EmbeddingApiClient,
}

impl EmbeddingProvider {
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        let (provider, model) = parse_provider_model(&config.model);

        let needs_api_key = !matches!(provider.to_lowercase().as_str(), "ollama" | "lmstudio");
        if needs_api_key && config.api_key.is_none() {
            return Err(LontarError::Embedding(format!(
                "API key required for embedding provider '{provider}'"
            )));
        }

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url(provider).to_string());

        let client = EmbeddingApiClient::new(ApiConfig {
            base_url,
            api_key: config.api_key.clone(),
            model: model.to_string(),
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
        })?;

        Ok(Self { client })
    }

    /// Embed one query string.
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let vectors = self.client.embed(&[text]).await?;
        vectors
            .into_iter()
            .next()
            .ok_or_else(|| LontarError::Embedding("No embedding returned".to_string()))
    }

    /// Embed a batch of chunk texts, preserving order.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        self.client.embed(&refs).await
    }
}
