//! Conversation digest for generative calls.
//!
//! The generation collaborator never sees raw history. It gets a short
//! labeled digest of the last few exchanges, each entry truncated so one
//! long rant cannot crowd out the rest of the context.

use crate::domain::models::{Role, SessionState};

const DIGEST_ENTRIES: usize = 4;
const ENTRY_MAX_CHARS: usize = 400;

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

/// Build the digest of the last few exchanges, or `None` on an empty
/// history.
pub fn build_digest(state: &SessionState) -> Option<String> {
    if state.history.is_empty() {
        return None;
    }

    let start = state.history.len().saturating_sub(DIGEST_ENTRIES);
    let lines: Vec<String> = state
        .history
        .iter()
        .skip(start)
        .map(|entry| {
            let label = match entry.role {
                Role::User => "User",
                Role::Agent => "Agent",
            };
            format!("{label}: {}", truncate(&entry.content, ENTRY_MAX_CHARS))
        })
        .collect();

    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::SessionState;

    #[test]
    fn test_empty_history_yields_none() {
        let state = SessionState::default();
        assert!(build_digest(&state).is_none());
    }

    #[test]
    fn test_digest_takes_recent_entries_only() {
        let mut state = SessionState::default();
        for i in 0..5 {
            state.record_exchange(&format!("question {i}"), &format!("answer {i}"), 20);
        }

        let digest = build_digest(&state).expect("non-empty history");
        assert!(digest.contains("question 4"));
        assert!(digest.contains("answer 4"));
        assert!(!digest.contains("question 0"));
        assert_eq!(digest.lines().count(), 4);
    }

    #[test]
    fn test_long_entries_are_truncated() {
        let mut state = SessionState::default();
        state.record_exchange(&"x".repeat(900), "short answer", 20);

        let digest = build_digest(&state).expect("non-empty history");
        let user_line = digest.lines().next().expect("user line");
        assert!(user_line.chars().count() < 420);
        assert!(user_line.ends_with('…'));
    }

    #[test]
    fn test_labels_present() {
        let mut state = SessionState::default();
        state.record_exchange("hi", "hello", 20);
        let digest = build_digest(&state).expect("non-empty history");
        assert!(digest.starts_with("User: hi"));
        assert!(digest.contains("Agent: hello"));
    }
}
