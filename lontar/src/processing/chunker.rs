//! Windowing of session turns into embeddable chunks.

use crate::models::{ChunkDraft, MergedTurn};

/// Partition one session into consecutive, non-overlapping windows of at
/// most `bubble_per_chunk` formatted bubbles. Sessions that reduce to a
/// single bubble carry no retrievable dialogue and produce nothing.
pub fn chunk_session(
    conv_id: &str,
    session_index: usize,
    session: &[MergedTurn],
    bubble_per_chunk: usize,
) -> Vec<ChunkDraft> {
    let bubbles: Vec<String> = session.iter().filter_map(format_bubble).collect();
    if bubbles.len() <= 1 {
        return Vec::new();
    }

    let window = bubble_per_chunk.max(1);
    bubbles
        .chunks(window)
        .enumerate()
        .map(|(chunk_index, bubble_window)| ChunkDraft {
            conv_id: conv_id.to_string(),
            session_index,
            chunk_index,
            bubble_count: bubble_window.len(),
            text: bubble_window.join("\n"),
        })
        .collect()
}

/// Render one turn as a bubble: `"<Role>:\n<text>"` with the role
/// capitalized. Turns whose text trims to nothing are skipped.
fn format_bubble(turn: &MergedTurn) -> Option<String> {
    let text = turn.text.trim();
    if text.is_empty() {
        return None;
    }
    Some(format!("{}:\n{}", capitalize(&turn.role), text))
}

fn capitalize(role: &str) -> String {
    let mut chars = role.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str().to_lowercase().as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn turn(role: &str, text: &str) -> MergedTurn {
        MergedTurn {
            role: role.to_string(),
            text: text.to_string(),
            created_at: NaiveDateTime::parse_from_str("2024-03-01T09:00:00", "%Y-%m-%dT%H:%M:%S")
                .unwrap(),
        }
    }

    #[test]
    fn bubbles_are_formatted_with_capitalized_role() {
        let session = vec![turn("user", "halo"), turn("assistant", "halo kak")];
        let chunks = chunk_session("c1", 0, &session, 5);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "User:\nhalo\nAssistant:\nhalo kak");
        assert_eq!(chunks[0].bubble_count, 2);
        assert_eq!(chunks[0].chunk_index, 0);
    }

    #[test]
    fn single_bubble_sessions_are_skipped() {
        let session = vec![turn("user", "halo")];
        assert!(chunk_session("c1", 0, &session, 5).is_empty());

        // A second turn with blank text still leaves only one bubble.
        let session = vec![turn("user", "halo"), turn("assistant", "   ")];
        assert!(chunk_session("c1", 0, &session, 5).is_empty());
    }

    #[test]
    fn twelve_bubbles_window_into_five_five_two() {
        let session: Vec<MergedTurn> = (0..12)
            .map(|i| {
                let role = if i % 2 == 0 { "user" } else { "assistant" };
                turn(role, &format!("pesan {i}"))
            })
            .collect();

        let chunks = chunk_session("c1", 3, &session, 5);
        assert_eq!(chunks.len(), 3);
        assert_eq!(
            chunks.iter().map(|c| c.bubble_count).collect::<Vec<_>>(),
            vec![5, 5, 2]
        );
        assert_eq!(
            chunks.iter().map(|c| c.chunk_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(chunks.iter().all(|c| c.session_index == 3));
    }

    #[test]
    fn concatenated_windows_reconstruct_the_bubble_sequence() {
        let session: Vec<MergedTurn> = (0..7)
            .map(|i| turn(if i % 2 == 0 { "user" } else { "agent" }, &format!("t{i}")))
            .collect();

        let chunks = chunk_session("c1", 0, &session, 3);
        let rejoined: Vec<String> = chunks
            .iter()
            .flat_map(|c| c.text.split('\n').map(str::to_string))
            .collect();

        let expected: Vec<String> = session
            .iter()
            .flat_map(|t| {
                vec![
                    format!("{}:", capitalize(&t.role)),
                    t.text.clone(),
                ]
            })
            .collect();
        assert_eq!(rejoined, expected);
    }

    #[test]
    fn exact_multiple_fills_every_window() {
        let session: Vec<MergedTurn> = (0..10)
            .map(|i| turn(if i % 2 == 0 { "user" } else { "assistant" }, &format!("t{i}")))
            .collect();

        let chunks = chunk_session("c1", 0, &session, 5);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.bubble_count == 5));
    }
}
