use serde::{Deserialize, Serialize};

/// A window of consecutive bubbles from one session, before embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkDraft {
    pub conv_id: String,
    pub session_index: usize,
    pub chunk_index: usize,
    pub bubble_count: usize,
    pub text: String,
}

/// A persisted chunk record: draft metadata plus its embedding vector.
/// This is the unit the index loads, searches, and the store serializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub conv_id: String,
    pub session_index: usize,
    pub chunk_index: usize,
    pub bubble_count: usize,
    pub text: String,
    pub vector: Vec<f32>,
}

impl ChunkDraft {
    pub fn into_record(self, vector: Vec<f32>) -> ChunkRecord {
        ChunkRecord {
            conv_id: self.conv_id,
            session_index: self.session_index,
            chunk_index: self.chunk_index,
            bubble_count: self.bubble_count,
            text: self.text,
            vector,
        }
    }
}
