//! Question clamp.
//!
//! At most `max_questions` question sentences survive a reply. Excess
//! questions are converted to statements when the phrasing allows it and
//! dropped when it doesn't.

use crate::services::shaping::{map_paragraphs, split_sentences};

/// Openers that make a sentence interrogative at its core; such sentences
/// cannot be statement-ified and are dropped instead.
const INTERROGATIVE_OPENERS: &[&str] = &[
    "what", "why", "how", "which", "who", "when", "where", "do ", "does", "did", "are ", "is ",
    "can ", "could", "would", "should", "shall", "have you", "has ",
];

fn is_question(sentence: &str) -> bool {
    sentence.trim_end().ends_with('?')
}

fn starts_interrogative(sentence: &str) -> bool {
    let lowered = sentence.trim_start().to_lowercase();
    INTERROGATIVE_OPENERS.iter().any(|o| lowered.starts_with(o))
}

/// Turn a rhetorical-tail question into a statement ("you could stop
/// there, right?" -> "you could stop there."). Returns `None` when the
/// sentence is interrogative at its core.
fn to_statement(sentence: &str) -> Option<String> {
    if starts_interrogative(sentence) {
        return None;
    }
    let trimmed = sentence.trim_end().trim_end_matches('?').trim_end();
    let trimmed = trimmed
        .trim_end_matches(", right")
        .trim_end_matches(", no")
        .trim_end_matches(", yes")
        .trim_end();
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("{trimmed}."))
    }
}

/// Clamp the question count across the whole reply. Paragraph and
/// enumeration line structure survive the clamp.
pub fn clamp(text: &str, max_questions: u8) -> String {
    let mut kept = 0usize;
    let budget = usize::from(max_questions);

    map_paragraphs(text, |line| {
        split_sentences(line)
            .into_iter()
            .filter_map(|sentence| {
                if !is_question(&sentence) {
                    return Some(sentence);
                }
                if kept < budget {
                    kept += 1;
                    return Some(sentence);
                }
                to_statement(&sentence)
            })
            .collect::<Vec<_>>()
            .join(" ")
    })
}

/// Count question sentences in a reply.
pub fn count(text: &str) -> usize {
    text.split("\n\n")
        .flat_map(|p| split_sentences(p))
        .filter(|s| is_question(s))
        .count()
}
