use std::sync::Arc;

use crate::config::{parse_provider_model, LlmConfig};
use crate::error::{LontarError, Result};
use crate::llm::api::LlmApiClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAI,
    OpenRouter,
    Ollama,
    LmStudio,
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct LlmProvider {
    backend: LlmBackend,
    config: Arc<LlmConfig>,
}

impl LlmProvider {
    pub fn new(config: &LlmConfig) -> Self {
        let (provider, _model) = parse_provider_model(&config.model);

        let needs_api_key = !matches!(provider.to_lowercase().as_str(), "ollama" | "lmstudio");
        let backend = if needs_api_key && config.api_key.is_none() {
            LlmBackend::Unavailable {
                reason: format!("API key required for provider '{provider}'"),
            }
        } else {
            match provider.to_lowercase().as_str() {
                "openrouter" => LlmBackend::OpenRouter,
                "ollama" => LlmBackend::Ollama,
                "lmstudio" => LlmBackend::LmStudio,
                _ => LlmBackend::OpenAI,
            }
        };

        Self {
            backend,
            config: Arc::new(config.clone()),
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, LlmBackend::Unavailable { .. })
    }

    pub fn backend(&self) -> &LlmBackend {
        &self.backend
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    pub async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: Option<&CompletionOptions>,
    ) -> Result<String> {
        if let LlmBackend::Unavailable { reason } = &self.backend {
            return Err(LontarError::LlmUnavailable(reason.clone()));
        }

        let client = LlmApiClient::new(&self.config)?;
        client.complete(prompt, system_prompt, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(model: &str, api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            model: model.to_string(),
            api_key: api_key.map(str::to_string),
            base_url: None,
            timeout_secs: 30,
            max_retries: 3,
            temperature: 0.25,
            max_tokens: 500,
        }
    }

    #[test]
    fn backend_detection_follows_the_model_prefix() {
        let provider = LlmProvider::new(&config("openai/gpt-4o-mini", Some("k")));
        assert_eq!(provider.backend(), &LlmBackend::OpenAI);

        let provider = LlmProvider::new(&config("openrouter/openai/gpt-4o", Some("k")));
        assert_eq!(provider.backend(), &LlmBackend::OpenRouter);

        let provider = LlmProvider::new(&config("ollama/llama3", None));
        assert_eq!(provider.backend(), &LlmBackend::Ollama);
    }

    #[test]
    fn missing_api_key_makes_the_provider_unavailable() {
        let provider = LlmProvider::new(&config("openai/gpt-4o-mini", None));
        assert!(!provider.is_available());

        // Keyless local providers stay available.
        let provider = LlmProvider::new(&config("lmstudio/qwen2", None));
        assert!(provider.is_available());
    }

    #[tokio::test]
    async fn unavailable_provider_fails_completion_up_front() {
        let provider = LlmProvider::new(&config("openai/gpt-4o-mini", None));
        let result = provider.complete("halo", None, None).await;
        assert!(matches!(result, Err(LontarError::LlmUnavailable(_))));
    }
}
