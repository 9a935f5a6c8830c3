//! Operator-facing batch jobs: `clean` turns a raw chat export into
//! per-conversation session lists, `embed` turns cleaned sessions into the
//! persisted chunk store. Both fail fast on input errors; only collaborator
//! calls get retries (inside the embedding client).

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::Duration;

use crate::config::IngestConfig;
use crate::embeddings::EmbeddingProvider;
use crate::error::{LontarError, Result};
use crate::index::store;
use crate::models::{ChunkDraft, ChunkRecord, CleanedMessage, RawLogEntry, Session};
use crate::processing::{chunker, normalizer, sessions};

/// Raw export shape: conversation id to ordered message list.
pub type RawExport = BTreeMap<String, Vec<RawLogEntry>>;

/// Cleaned shape: conversation id to ordered session list.
pub type CleanedExport = BTreeMap<String, Vec<Session>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanSummary {
    pub conversations: usize,
    pub sessions: usize,
    pub turns: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedSummary {
    pub chunks: usize,
    pub batches: usize,
}

/// Run the cleaning job: read the raw export, normalize and segment every
/// conversation, and write the cleaned session file.
pub fn run_clean(input: &Path, output: &Path, config: &IngestConfig) -> Result<CleanSummary> {
    if !input.exists() {
        return Err(LontarError::NotFound(format!(
            "input file {} does not exist",
            input.display()
        )));
    }

    let raw: RawExport = serde_json::from_reader(BufReader::new(File::open(input)?))?;
    let cleaned = clean_conversations(raw, config);

    let summary = CleanSummary {
        conversations: cleaned.len(),
        sessions: cleaned.values().map(|sessions| sessions.len()).sum(),
        turns: cleaned
            .values()
            .flat_map(|sessions| sessions.iter())
            .map(|session| session.len())
            .sum(),
    };

    serde_json::to_writer_pretty(BufWriter::new(File::create(output)?), &cleaned)?;
    tracing::info!(
        conversations = summary.conversations,
        sessions = summary.sessions,
        output = %output.display(),
        "cleaning finished"
    );

    Ok(summary)
}

/// Normalize and segment every conversation of a raw export. Conversations
/// where nothing survives normalization map to an empty session list.
pub fn clean_conversations(raw: RawExport, config: &IngestConfig) -> CleanedExport {
    let gap = Duration::hours(config.followup_hours);
    let mut cleaned = CleanedExport::new();

    for (conv_id, entries) in limit_conversations(raw, config.limit_conversations) {
        tracing::debug!(conv_id = %conv_id, messages = entries.len(), "processing conversation");

        let filtered: Vec<CleanedMessage> = entries
            .iter()
            .filter_map(|entry| {
                let role = entry.role.to_lowercase();
                normalizer::normalize(&role, &entry.chat).map(|text| CleanedMessage {
                    role,
                    text,
                    created_at: entry.created_at.clone(),
                })
            })
            .collect();

        let sessions = sessions::build_sessions(&filtered, gap);
        cleaned.insert(conv_id, sessions);
    }

    cleaned
}

fn limit_conversations(raw: RawExport, limit: usize) -> RawExport {
    if limit == 0 {
        return raw;
    }
    raw.into_iter().take(limit).collect()
}

/// Chunk every session of a cleaned export, in conversation order.
pub fn chunk_conversations(cleaned: &CleanedExport, bubble_per_chunk: usize) -> Vec<ChunkDraft> {
    cleaned
        .iter()
        .flat_map(|(conv_id, sessions)| {
            sessions.iter().enumerate().flat_map(move |(session_index, session)| {
                chunker::chunk_session(conv_id, session_index, session, bubble_per_chunk)
            })
        })
        .collect()
}

/// Run the embedding job: chunk the cleaned sessions, embed the chunk texts
/// in batches, and write the chunk store. A failed batch aborts the whole
/// job; the store is only written once every chunk has its vector.
pub async fn run_embed(
    input: &Path,
    output: &Path,
    config: &IngestConfig,
    embeddings: &EmbeddingProvider,
) -> Result<EmbedSummary> {
    if !input.exists() {
        return Err(LontarError::NotFound(format!(
            "input file {} does not exist",
            input.display()
        )));
    }

    let cleaned: CleanedExport = serde_json::from_reader(BufReader::new(File::open(input)?))?;
    let drafts = chunk_conversations(&cleaned, config.bubble_per_chunk);

    let batch_size = config.embed_batch_size.max(1);
    let total_batches = drafts.len().div_ceil(batch_size);
    let mut records: Vec<ChunkRecord> = Vec::with_capacity(drafts.len());

    for (batch_index, batch) in drafts.chunks(batch_size).enumerate() {
        tracing::info!(batch = batch_index + 1, total = total_batches, "embedding batch");

        let texts: Vec<String> = batch.iter().map(|draft| draft.text.clone()).collect();
        let vectors = embeddings.embed_batch(&texts).await?;

        for (draft, vector) in batch.iter().cloned().zip(vectors) {
            records.push(draft.into_record(vector));
        }
    }

    store::save_records(output, &records)?;
    tracing::info!(
        chunks = records.len(),
        output = %output.display(),
        "embedding finished"
    );

    Ok(EmbedSummary {
        chunks: records.len(),
        batches: total_batches,
    })
}
