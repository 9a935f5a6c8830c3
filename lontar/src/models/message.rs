use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One entry of the raw chat export, as found in the source log file:
/// a mapping from conversation id to an ordered list of these.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLogEntry {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub chat: String,
    #[serde(default)]
    pub created_at: String,
}

/// A message that survived normalization. The role is lower-cased and the
/// text is whitespace-collapsed and non-empty; `created_at` is kept as the
/// source string and parsed lazily by the session builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedMessage {
    pub role: String,
    pub text: String,
    pub created_at: String,
}

/// A run of consecutive same-role messages merged into one turn. The text
/// joins the run's messages with single spaces; `created_at` is the
/// timestamp of the run's first message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedTurn {
    pub role: String,
    pub text: String,
    pub created_at: NaiveDateTime,
}

/// One bounded conversation episode, cut wherever a responder reply lagged
/// too far behind the triggering user turn.
pub type Session = Vec<MergedTurn>;
