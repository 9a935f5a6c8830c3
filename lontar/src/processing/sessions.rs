//! Session building: merge consecutive same-role messages, then split the
//! merged stream into bounded conversation episodes.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::models::{CleanedMessage, MergedTurn, Session};

/// Roles whose late arrival cuts a new session.
pub const RESPONDER_ROLES: &[&str] = &["assistant", "agent"];

/// Build sessions from normalized messages in chronological order.
///
/// `followup_gap` is used twice: consecutive same-role messages merge into
/// one turn while they stay within the gap of the run's first message, and
/// a responder turn arriving more than the gap after the last user turn
/// starts a new session.
pub fn build_sessions(messages: &[CleanedMessage], followup_gap: Duration) -> Vec<Session> {
    let merged = merge_consecutive(messages, followup_gap);
    split_sessions(merged, followup_gap)
}

/// Parse a source timestamp. The export writes ISO-8601, sometimes with a
/// trailing `Z` and sometimes with fractional seconds; offsets are not
/// produced by the exporter but are accepted anyway.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    let value = value.strip_suffix('Z').unwrap_or(value);
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

/// Merge runs of same-role messages into single turns.
///
/// A message continues the open run iff its role matches and its timestamp
/// is within `gap` of the run's FIRST message. The gap is deliberately not
/// re-anchored on every append; a long run can therefore span messages that
/// are further than `gap` apart from each other. Changing this to
/// gap-from-previous changes segmentation outcomes downstream.
fn merge_consecutive(messages: &[CleanedMessage], gap: Duration) -> Vec<MergedTurn> {
    let mut merged: Vec<MergedTurn> = Vec::new();
    let mut buffer: Option<(String, Vec<String>, NaiveDateTime)> = None;
    // An unparseable timestamp degrades to a zero-duration gap: the last
    // successfully parsed time is reused instead of aborting the batch.
    let mut last_parsed: Option<NaiveDateTime> = None;

    for msg in messages {
        let time = match parse_timestamp(&msg.created_at) {
            Some(t) => {
                last_parsed = Some(t);
                t
            }
            None => {
                tracing::warn!(created_at = %msg.created_at, "unparseable timestamp, treating as zero gap");
                last_parsed.unwrap_or_else(|| DateTime::<Utc>::UNIX_EPOCH.naive_utc())
            }
        };

        buffer = match buffer.take() {
            None => Some((msg.role.clone(), vec![msg.text.clone()], time)),
            Some((role, mut texts, start)) => {
                if role == msg.role && time.signed_duration_since(start) <= gap {
                    texts.push(msg.text.clone());
                    Some((role, texts, start))
                } else {
                    merged.push(MergedTurn {
                        role,
                        text: texts.join(" "),
                        created_at: start,
                    });
                    Some((msg.role.clone(), vec![msg.text.clone()], time))
                }
            }
        };
    }

    if let Some((role, texts, start)) = buffer {
        merged.push(MergedTurn {
            role,
            text: texts.join(" "),
            created_at: start,
        });
    }

    merged
}

/// Cut the merged stream into sessions wherever a responder turn arrives
/// more than `gap` after the most recent user turn.
fn split_sessions(turns: Vec<MergedTurn>, gap: Duration) -> Vec<Session> {
    let mut sessions: Vec<Session> = Vec::new();
    let mut current: Session = Vec::new();
    let mut last_user_time: Option<NaiveDateTime> = None;

    for turn in turns {
        if turn.role == "user" {
            last_user_time = Some(turn.created_at);
        }

        let late_reply = RESPONDER_ROLES.contains(&turn.role.as_str())
            && last_user_time
                .is_some_and(|t| turn.created_at.signed_duration_since(t) > gap);

        if late_reply {
            if !current.is_empty() {
                sessions.push(std::mem::take(&mut current));
            }
            current.push(turn);
            continue;
        }

        current.push(turn);
    }

    if !current.is_empty() {
        sessions.push(current);
    }

    sessions
}
