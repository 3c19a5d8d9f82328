//! Conversational gate classifiers: acknowledgments, ambiguity, expand
//! requests, term questions, confusion, and irritation markers.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::models::Term;
use crate::services::classifiers::topics;
use crate::services::lenses;

const SHORT_ACKS: &[&str] = &[
    "ok", "okay", "yes", "yep", "yeah", "sure", "fine", "both", "go ahead", "alright", "sounds good",
    "let's", "lets", "do it", "go on",
];

/// Closing acknowledgments. These must short-circuit the ambiguity gate:
/// "understood, thanks" is never an orientation candidate.
const CLOSING_ACKS: &[&str] = &[
    "thanks",
    "thank you",
    "understood",
    "got it",
    "makes sense",
    "that helps",
    "clear now",
    "all clear",
    "appreciate it",
];

const SHORT_AMBIGUOUS: &[&str] = &["both", "all", "yes", "no", "ok", "okay", "either", "any"];

const VAGUE_MARKERS: &[&str] = &[
    "i feel bad",
    "feeling bad",
    "it's complicated",
    "hard to say",
    "don't know where to start",
    "not sure",
    "dunno",
    "everything is wrong",
    "just tired",
    "feel off",
    "it's all too much",
];

const CONFUSION_MARKERS: &[&str] = &[
    "i don't understand",
    "i dont understand",
    "i'm confused",
    "im confused",
    "makes no sense",
    "that's unclear",
    "not clear to me",
    "lost me",
];

const PRAGMATIC_MARKERS: &[&str] = &[
    "be specific",
    "get to the point",
    "stop being vague",
    "enough philosophy",
    "no more philosophy",
    "skip the philosophy",
    "what's the use of",
    "that's a stock phrase",
    "you're not hearing me",
    "you are not hearing me",
    "cut the fluff",
];

const IRRITATION_BREVITY_MARKERS: &[&str] =
    &["too short", "so short", "scraps", "formulaic", "sounds templated", "like a template"];

const STRUCTURE_MARKERS: &[&str] = &[
    "give me steps",
    "give me a model",
    "just the steps",
    "no filler",
    "no fluff",
    "a checklist",
    "check-list",
    "prioritize",
    "action plan",
    "next steps",
    "step by step",
    "bullet points",
    "just specifics",
    "concrete steps",
    "structure it",
];

const GUIDANCE_TRIGGERS: &[&str] = &[
    "what should i do",
    "what do i do",
    "how do i deal",
    "how do i handle",
    "help me decide",
    "help me figure",
    "what's my next move",
    "tell me what to do",
];

fn expand_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(explain|clarify|elaborate|unpack that|more detail|in more depth|break (it|that) down|give (me )?an example|for example\?|what do you mean|how does (that|this) work|walk me through)\b",
        )
        .unwrap()
    })
}

fn norm(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Short acknowledgment usable to resume a pending follow-through.
pub fn is_short_ack(text: &str) -> bool {
    let t = norm(text);
    let stripped: String = t.chars().filter(|c| c.is_alphanumeric() || *c == ' ').collect();
    let stripped = stripped.trim().to_string();
    if stripped.is_empty() {
        return false;
    }
    SHORT_ACKS.contains(&stripped.as_str())
        || (stripped.len() <= 3 && stripped.chars().all(char::is_alphabetic))
}

/// Accepting acknowledgment ("ok", "go ahead"): resolves a pending
/// follow-through in favor of its default. Deliberately excludes the
/// ambiguous short replies ("both", "either") that re-present options.
pub fn is_accept(text: &str) -> bool {
    const ACCEPTS: &[&str] = &[
        "ok", "okay", "yes", "yep", "yeah", "sure", "fine", "go ahead", "alright", "sounds good",
        "do it", "go on", "let's", "lets", "let's do it", "lets do it",
    ];
    let t = norm(text);
    let stripped: String = t.chars().filter(|c| c.is_alphanumeric() || *c == ' ').collect();
    ACCEPTS.contains(&stripped.trim())
}

/// Explicit acknowledgment/closing phrase ("understood, thanks").
pub fn is_acknowledgment(text: &str) -> bool {
    let t = norm(text);
    if t.len() > 60 {
        return false;
    }
    CLOSING_ACKS.iter().any(|m| t.contains(m)) || is_short_ack(text)
}

/// Short ambiguous reply ("both", "yes") used to re-present offered options.
pub fn is_short_ambiguous(text: &str) -> bool {
    let t = norm(text);
    let stripped: String = t.chars().filter(|c| c.is_alphanumeric()).collect();
    SHORT_AMBIGUOUS.contains(&t.as_str())
        || (stripped.len() <= 3 && !stripped.is_empty() && stripped.chars().all(char::is_alphabetic))
}

/// Expand/explain request: more depth on the prior turn, not a new topic.
pub fn is_expand_request(text: &str) -> bool {
    expand_re().is_match(&norm(text))
}

/// Vague/low-signal input that warrants a coarse orientation question.
///
/// Never fires when a domain-topic keyword or an acknowledgment/closing
/// phrase is present.
pub fn is_ambiguous(text: &str, max_chars: usize) -> bool {
    let t = norm(text);
    if t.is_empty() || is_acknowledgment(text) {
        return false;
    }
    if lenses::has_lens_keyword(&t) || topics::has_topic_marker(&t) {
        return false;
    }
    if VAGUE_MARKERS.iter().any(|m| t.contains(m)) {
        return true;
    }
    t.chars().count() <= max_chars && !t.contains('?')
}

/// "what is a frame/lens/optic": answered example-first, no generation.
pub fn term_question(text: &str) -> Option<Term> {
    let t = norm(text);
    let asking = t.contains("what is") || t.contains("what's a") || t.contains("what does")
        || t.contains("explain") || t.contains("define");
    if !asking {
        return None;
    }
    if t.contains("frame") {
        Some(Term::Frame)
    } else if t.contains("lens") {
        Some(Term::Lens)
    } else if t.contains("optic") {
        Some(Term::Optic)
    } else {
        None
    }
}

/// "I don't understand": replace clarifying questions with an example.
pub fn is_confusion(text: &str) -> bool {
    let t = norm(text);
    CONFUSION_MARKERS.iter().any(|m| t.contains(m))
}

/// Pragmatic/irritation markers: drop templated small talk this turn.
pub fn is_pragmatic(text: &str) -> bool {
    let t = norm(text);
    PRAGMATIC_MARKERS.iter().any(|m| t.contains(m))
}

/// Irritation specifically at short, formulaic replies.
pub fn is_irritated_at_brevity(text: &str) -> bool {
    let t = norm(text);
    IRRITATION_BREVITY_MARKERS.iter().any(|m| t.contains(m))
}

/// "just give me steps, no filler": structured/format-demanding request.
pub fn is_structure_demand(text: &str) -> bool {
    let t = norm(text);
    STRUCTURE_MARKERS.iter().any(|m| t.contains(m))
}

/// "what should I do": jump straight to guidance stage.
pub fn is_guidance_trigger(text: &str) -> bool {
    let t = norm(text);
    GUIDANCE_TRIGGERS.iter().any(|m| t.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_acks() {
        assert!(is_short_ack("ok"));
        assert!(is_short_ack("Yes."));
        assert!(is_short_ack("both"));
        assert!(!is_short_ack("okay but what about my savings"));
    }

    #[test]
    fn test_accept_excludes_ambiguous_shorts() {
        assert!(is_accept("ok"));
        assert!(is_accept("Go ahead!"));
        assert!(!is_accept("both"));
        assert!(!is_accept("either"));
    }

    #[test]
    fn test_acknowledgment_never_ambiguous() {
        assert!(is_acknowledgment("understood, thanks"));
        assert!(is_acknowledgment("thanks, got it"));
        assert!(!is_ambiguous("understood, thanks", 60));
        assert!(!is_ambiguous("thanks, got it", 60));
    }

    #[test]
    fn test_topic_keyword_suppresses_ambiguity() {
        assert!(!is_ambiguous("money again", 60));
        assert!(!is_ambiguous("everything is chaos", 60));
    }

    #[test]
    fn test_vague_input_is_ambiguous() {
        assert!(is_ambiguous("i feel bad", 60));
        assert!(is_ambiguous("it's complicated, hard to say", 60));
    }

    #[test]
    fn test_expand_requests() {
        assert!(is_expand_request("can you explain that in more depth"));
        assert!(is_expand_request("break that down for me"));
        assert!(!is_expand_request("my day was long"));
    }

    #[test]
    fn test_term_question() {
        assert_eq!(term_question("what is a frame, exactly?"), Some(Term::Frame));
        assert_eq!(term_question("explain the lens thing"), Some(Term::Lens));
        assert_eq!(term_question("what is going on"), None);
    }

    #[test]
    fn test_structure_demand() {
        assert!(is_structure_demand("just give me steps, no filler"));
        assert!(is_structure_demand("I want a checklist, prioritize it"));
        assert!(!is_structure_demand("I walked up some steps today"));
    }

    #[test]
    fn test_pragmatic_markers() {
        assert!(is_pragmatic("stop being vague and get to the point"));
        assert!(is_irritated_at_brevity("why are your answers so short and formulaic"));
    }
}
