//! Per-conversation short-term memory: a rolling log of question/answer
//! exchanges used to build dialogue context for the prompt.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

/// One completed question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub user: String,
    pub assistant: String,
    pub timestamp: String,
}

#[derive(Debug)]
pub struct ConversationMemory {
    conv_id: String,
    history: Vec<Exchange>,
    /// Oldest exchanges are evicted past this bound; `0` disables eviction.
    max_exchanges: usize,
}

impl ConversationMemory {
    pub fn new(conv_id: &str, max_exchanges: usize) -> Self {
        Self {
            conv_id: conv_id.to_string(),
            history: Vec::new(),
            max_exchanges,
        }
    }

    pub fn conv_id(&self) -> &str {
        &self.conv_id
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Append a completed exchange, evicting the oldest when capped.
    pub fn add_exchange(&mut self, user_query: &str, assistant_response: &str) {
        self.history.push(Exchange {
            user: user_query.to_string(),
            assistant: assistant_response.to_string(),
            timestamp: chrono::Local::now()
                .format("%Y-%m-%dT%H:%M:%S%.f")
                .to_string(),
        });

        if self.max_exchanges > 0 && self.history.len() > self.max_exchanges {
            let excess = self.history.len() - self.max_exchanges;
            self.history.drain(..excess);
        }
    }

    /// Render the last `n_last` exchanges as prompt context lines.
    pub fn recent_context(&self, n_last: usize) -> String {
        let start = self.history.len().saturating_sub(n_last);
        let mut context = String::new();
        for exchange in &self.history[start..] {
            context.push_str(&format!(
                "User: {}\nAssistant: {}\n",
                exchange.user, exchange.assistant
            ));
        }
        context
    }
}

/// Lazily-populated map of conversation memories. Each conversation gets
/// its own mutex; a request holds it for the whole answer cycle, so writers
/// to one conversation are serialized while other conversations proceed.
pub struct MemoryStore {
    conversations: RwLock<HashMap<String, Arc<Mutex<ConversationMemory>>>>,
    max_exchanges: usize,
}

impl MemoryStore {
    pub fn new(max_exchanges: usize) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            max_exchanges,
        }
    }

    pub async fn get_or_create(&self, conv_id: &str) -> Arc<Mutex<ConversationMemory>> {
        if let Some(memory) = self.conversations.read().await.get(conv_id) {
            return Arc::clone(memory);
        }

        let mut conversations = self.conversations.write().await;
        Arc::clone(conversations.entry(conv_id.to_string()).or_insert_with(|| {
            Arc::new(Mutex::new(ConversationMemory::new(conv_id, self.max_exchanges)))
        }))
    }

    /// Exchange count for one conversation; `0` when it has no memory yet.
    pub async fn exchange_count(&self, conv_id: &str) -> usize {
        match self.conversations.read().await.get(conv_id) {
            Some(memory) => memory.lock().await.len(),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_context_renders_last_exchanges() {
        let mut memory = ConversationMemory::new("c1", 0);
        memory.add_exchange("berapa harga paket?", "Mulai dari 5 juta kak.");
        memory.add_exchange("ada diskon?", "Ada untuk paket tahunan kak.");
        memory.add_exchange("oke lanjut", "Siap kak.");

        let context = memory.recent_context(2);
        assert!(!context.contains("berapa harga paket?"));
        assert!(context.contains("User: ada diskon?\nAssistant: Ada untuk paket tahunan kak.\n"));
        assert!(context.ends_with("User: oke lanjut\nAssistant: Siap kak.\n"));
    }

    #[test]
    fn empty_memory_renders_empty_context() {
        let memory = ConversationMemory::new("c1", 0);
        assert_eq!(memory.recent_context(2), "");
    }

    #[test]
    fn cap_evicts_oldest_exchanges() {
        let mut memory = ConversationMemory::new("c1", 2);
        memory.add_exchange("satu", "1");
        memory.add_exchange("dua", "2");
        memory.add_exchange("tiga", "3");

        assert_eq!(memory.len(), 2);
        let context = memory.recent_context(10);
        assert!(!context.contains("satu"));
        assert!(context.contains("dua"));
        assert!(context.contains("tiga"));
    }

    #[test]
    fn zero_cap_grows_without_eviction() {
        let mut memory = ConversationMemory::new("c1", 0);
        for i in 0..100 {
            memory.add_exchange(&format!("q{i}"), &format!("a{i}"));
        }
        assert_eq!(memory.len(), 100);
    }

    #[tokio::test]
    async fn store_creates_one_memory_per_conversation() {
        let store = MemoryStore::new(0);

        let first = store.get_or_create("conv_a").await;
        first.lock().await.add_exchange("halo", "halo kak");

        let again = store.get_or_create("conv_a").await;
        assert_eq!(again.lock().await.len(), 1);

        let other = store.get_or_create("conv_b").await;
        assert_eq!(other.lock().await.len(), 0);

        assert_eq!(store.exchange_count("conv_a").await, 1);
        assert_eq!(store.exchange_count("conv_missing").await, 0);
    }
}
