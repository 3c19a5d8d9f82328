//! Capability/meta-question classifier ("what can you do").
//!
//! Scored detector rather than a single phrase list: several weak signals
//! add up, and a long personal-context message is penalized so that "what
//! should I do about my job" never reads as a capability question.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::models::CapabilityIntent;

/// Topic markers that veto the capability read unless the message is
/// explicitly about the agent ("what do you", "how do you").
const TOPIC_VETO_MARKERS: &[&str] = &[
    "friend", "love", "death", "money", "moral", "meaning", "choice", "fear", "anxi", "sleep",
    "work", "fired", "divorce", "relationship", "family", "apath", "depress", "panic", "anger",
    "resent",
];

fn can_do_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(can you|are you able|do you know how|could you)\b").unwrap()
    })
}

fn capability_noun_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(capabilit|feature|function|option|mode|format|tool)").unwrap()
    })
}

fn about_you_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(about yourself|how do you work|how are you built|how you work|what are you)")
            .unwrap()
    })
}

fn usefulness_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(how are you useful|why do you exist|what's the point of you|what is the point of you|how can you help)")
            .unwrap()
    })
}

fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        if ch.is_alphanumeric() || ch.is_whitespace() || ch == '\'' {
            out.push(ch);
        } else {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Score the utterance as a capability/meta question.
pub fn detect_capability(text: &str, min_score: i32) -> CapabilityIntent {
    let raw = text;
    let t = normalize(text);
    if t.is_empty() {
        return CapabilityIntent::default();
    }

    let about_the_agent =
        t.contains("what do you") || t.contains("what can you") || t.contains("how do you");
    if TOPIC_VETO_MARKERS.iter().any(|m| t.contains(m)) && !about_the_agent {
        return CapabilityIntent::default();
    }

    let mut score = 0;
    if raw.contains('?') {
        score += 1;
    }
    if can_do_re().is_match(&t) {
        score += 2;
    }
    if capability_noun_re().is_match(&t) {
        score += 2;
    }
    if (t.starts_with("what ") || t.starts_with("how ") || t.contains(" what ")) && t.contains("you")
    {
        score += 1;
    }
    if about_you_re().is_match(&t) {
        score += 2;
    }
    if usefulness_re().is_match(&t) {
        score += 1;
    }
    // Long personal context: almost certainly a topic, not a meta question.
    if t.len() >= 140
        && ["i ", " me ", " my ", "today", "yesterday", "why", "help me"]
            .iter()
            .any(|m| t.contains(m))
    {
        score -= 2;
    }

    CapabilityIntent {
        matched: score >= min_score,
        score,
    }
}

/// Canned capability description, answered identically regardless of
/// conversation state.
pub fn capability_reply() -> String {
    "In short: I look at one question through several reflective frames and \
     let you switch between them.\n\n\
     For example:\n\
     - fear — through what is in your control, what isn't, and how to sit with the rest\n\
     - meaning — through choice, responsibility, and what an action affirms\n\
     - money — through sufficiency, dependence on a stream, and buffers\n\
     - identity — through the difference between a chapter and the whole book\n\n\
     You can ask directly: \"unpack this the stoic way\", \"now a different \
     angle\", or \"compare two approaches\". I don't push one school — we can \
     keep switching frames until one actually explains your situation."
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_capability_question() {
        let intent = detect_capability("What can you do? What features do you have?", 3);
        assert!(intent.matched);
        assert!(intent.score >= 3);
    }

    #[test]
    fn test_about_you_phrasing() {
        let intent = detect_capability("Tell me about yourself — how do you work?", 3);
        assert!(intent.matched);
    }

    #[test]
    fn test_topic_question_is_vetoed() {
        let intent = detect_capability("What should I do about money and my fear of losing it?", 3);
        assert!(!intent.matched);
    }

    #[test]
    fn test_long_personal_context_penalized() {
        let text = "I keep wondering what options I have because my work situation today \
                    is a mess and I need someone to help me figure out why everything \
                    went wrong with my manager yesterday";
        let intent = detect_capability(text, 3);
        assert!(!intent.matched);
    }

    #[test]
    fn test_empty_input_no_match() {
        assert!(!detect_capability("", 3).matched);
        assert!(!detect_capability("   ", 3).matched);
    }
}
