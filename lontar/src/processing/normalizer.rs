//! Message-level noise filters applied before session building.
//!
//! Chat exports are full of content that carries no retrievable meaning:
//! bare links, emoji-only reactions, one-letter acknowledgements, laughter
//! runs ("wkwkwk", "hehehe"). Everything here is a pure function of the
//! message itself.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static LINK_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?://\S+|www\.\S+)$").expect("valid regex"));

// Emoji, dingbats, enclosed alphanumerics and the symbol planes commonly
// emitted by mobile keyboards, plus whitespace.
static EMOJI_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\x{1F300}-\x{1FAFF}\x{2700}-\x{27BF}\x{24C2}-\x{1F251}\s]+$")
        .expect("valid regex")
});

/// Normalize one raw message, given its lower-cased role.
///
/// Returns the cleaned text, or `None` when the message should be dropped
/// entirely. Rules run in order: media role, empty text, whitespace
/// collapse, link-only, emoji-only, low-information.
pub fn normalize(role: &str, text: &str) -> Option<String> {
    if role == "media" || text.is_empty() {
        return None;
    }

    let text = collapse_whitespace(text);
    if text.is_empty()
        || is_link_only(&text)
        || is_emoji_only(&text)
        || is_low_information(&text)
    {
        return None;
    }

    Some(text)
}

/// Collapse runs of whitespace to single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// True when the entire text is a single URL and nothing else.
pub fn is_link_only(text: &str) -> bool {
    LINK_ONLY.is_match(&text.to_lowercase())
}

/// True when the text consists only of emoji/symbol codepoints and whitespace.
pub fn is_emoji_only(text: &str) -> bool {
    if text.is_empty() {
        return true;
    }
    EMOJI_ONLY.is_match(text)
}

/// True for texts too thin to retrieve anything from: a single character,
/// filler repetition (at most 2 distinct characters across at most 6), or
/// no alphanumeric content at all. Counts are Unicode scalars, not bytes.
pub fn is_low_information(text: &str) -> bool {
    let text = text.trim().to_lowercase();
    let len = text.chars().count();

    if len <= 1 {
        return true;
    }

    let distinct: HashSet<char> = text.chars().collect();
    if distinct.len() <= 2 && len <= 6 {
        return true;
    }

    if !text.chars().any(|c| c.is_alphanumeric()) {
        return true;
    }

    false
}
