use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ingest: IngestConfig,
    pub retrieval: RetrievalConfig,
    pub memory: MemoryConfig,
    pub embeddings: EmbeddingsConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Knobs for the offline cleaning and embedding jobs.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Follow-up tolerance in hours, used both for merging consecutive
    /// same-role messages and for cutting sessions on late replies.
    pub followup_hours: i64,
    /// Bubbles per embedded chunk window.
    pub bubble_per_chunk: usize,
    /// Process only the first N conversations of the raw export (0 = all).
    pub limit_conversations: usize,
    /// Chunks per embeddings API request.
    pub embed_batch_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Chunks retrieved per query.
    pub top_k: usize,
    /// Minimum best-match similarity before retrieved data is used.
    pub score_threshold: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Exchanges of short-term context included in the prompt.
    pub context_exchanges: usize,
    /// Per-conversation exchange cap; oldest are evicted past it (0 = unbounded).
    pub max_exchanges: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

/// LLM configuration for the completion model behind the chat service.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("LONTAR_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("LONTAR_PORT", 3000),
            },
            ingest: IngestConfig {
                followup_hours: parse_env_or("LONTAR_FOLLOWUP_HOURS", 20),
                bubble_per_chunk: parse_env_or("LONTAR_BUBBLE_PER_CHUNK", 5),
                limit_conversations: parse_env_or("LONTAR_LIMIT_CONVERSATIONS", 0),
                embed_batch_size: parse_env_or("LONTAR_EMBED_BATCH_SIZE", 100),
            },
            retrieval: RetrievalConfig {
                top_k: parse_env_or("LONTAR_TOP_K", 3),
                score_threshold: parse_env_or("LONTAR_SCORE_THRESHOLD", 0.45),
            },
            memory: MemoryConfig {
                context_exchanges: parse_env_or("LONTAR_CONTEXT_EXCHANGES", 2),
                max_exchanges: parse_env_or("LONTAR_MEMORY_MAX_EXCHANGES", 50),
            },
            embeddings: EmbeddingsConfig {
                model: env::var("EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "openai/text-embedding-3-small".to_string()),
                api_key: env::var("EMBEDDING_API_KEY").ok(),
                base_url: env::var("EMBEDDING_BASE_URL").ok(),
                timeout_secs: parse_env_or("EMBEDDING_TIMEOUT", 30),
                max_retries: parse_env_or("EMBEDDING_MAX_RETRIES", 3),
            },
            llm: LlmConfig {
                model: env::var("LLM_MODEL").unwrap_or_else(|_| "openai/gpt-4o-mini".to_string()),
                api_key: env::var("LLM_API_KEY").ok(),
                base_url: env::var("LLM_BASE_URL").ok(),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 30),
                max_retries: parse_env_or("LLM_MAX_RETRIES", 3),
                temperature: parse_env_or("LLM_TEMPERATURE", 0.25),
                max_tokens: parse_env_or("LLM_MAX_TOKENS", 500),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known providers that use OpenAI-compatible APIs.
pub const KNOWN_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Parse a model name into a (provider, model) tuple.
///
/// Unknown prefixes are not treated as providers; the whole string is the
/// model name and the provider defaults to `openai`.
pub fn parse_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    ("openai", model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_ingest_config_defaults() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("LONTAR_FOLLOWUP_HOURS");
        std::env::remove_var("LONTAR_BUBBLE_PER_CHUNK");
        std::env::remove_var("LONTAR_LIMIT_CONVERSATIONS");

        let config = Config::default();
        assert_eq!(config.ingest.followup_hours, 20);
        assert_eq!(config.ingest.bubble_per_chunk, 5);
        assert_eq!(config.ingest.limit_conversations, 0);
        assert_eq!(config.ingest.embed_batch_size, 100);
    }

    #[test]
    fn test_retrieval_config_defaults() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("LONTAR_TOP_K");
        std::env::remove_var("LONTAR_SCORE_THRESHOLD");

        let config = Config::default();
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.retrieval.score_threshold, 0.45);
    }

    #[test]
    fn test_llm_config_defaults() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("LLM_MODEL");
        std::env::remove_var("LLM_TEMPERATURE");
        std::env::remove_var("LLM_MAX_TOKENS");

        let config = Config::default();
        assert_eq!(config.llm.model, "openai/gpt-4o-mini");
        assert_eq!(config.llm.temperature, 0.25);
        assert_eq!(config.llm.max_tokens, 500);
        assert_eq!(config.llm.max_retries, 3);
    }

    #[test]
    fn test_followup_hours_from_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::set_var("LONTAR_FOLLOWUP_HOURS", "6");
        let config = Config::default();
        assert_eq!(config.ingest.followup_hours, 6);
        std::env::remove_var("LONTAR_FOLLOWUP_HOURS");
    }

    #[test]
    fn test_invalid_env_value_falls_back_to_default() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::set_var("LONTAR_TOP_K", "three");
        let config = Config::default();
        assert_eq!(config.retrieval.top_k, 3);
        std::env::remove_var("LONTAR_TOP_K");
    }

    #[test]
    fn test_parse_provider_model_known_prefix() {
        assert_eq!(
            parse_provider_model("openai/text-embedding-3-small"),
            ("openai", "text-embedding-3-small")
        );
        assert_eq!(parse_provider_model("ollama/llama3"), ("ollama", "llama3"));
    }

    #[test]
    fn test_parse_provider_model_unknown_prefix_is_model_name() {
        assert_eq!(
            parse_provider_model("BAAI/bge-small-en-v1.5"),
            ("openai", "BAAI/bge-small-en-v1.5")
        );
        assert_eq!(parse_provider_model("gpt-4o-mini"), ("openai", "gpt-4o-mini"));
    }
}
