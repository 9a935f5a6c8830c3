pub mod chunker;
pub mod normalizer;
pub mod pipeline;
pub mod sessions;

pub use chunker::chunk_session;
pub use normalizer::normalize;
pub use pipeline::{run_clean, run_embed, CleanSummary, EmbedSummary};
pub use sessions::build_sessions;
