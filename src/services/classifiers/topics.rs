//! Topic-level classifiers: substantive input, recurring patterns,
//! sensitive/religious content, tradition switches, and philosophy intent.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::models::Thresholds;
use crate::services::lenses;

const FULL_Q_MARKERS: &[&str] = &[
    "why", "how do", "how can", "how should", "what should", "what do i", "what if", "is it worth",
    "does it make sense", "am i wrong", "what's the point", "what is the point",
];

const SENSITIVE_MARKERS: &[&str] = &[
    "death", "dying", "grief", "grieving", "funeral", "divorce", "breakup", "broke up", "fired",
    "laid off", "diagnosis", "illness", "betray", "cheated on", "abuse",
];

const RELIGIOUS_MARKERS: &[&str] = &[
    "god", "faith", "pray", "prayer", "church", "sin", "soul", "religion", "religious", "scripture",
    "afterlife", "heaven", "hell",
];

const FINANCIAL_MARKERS: &[&str] = &[
    "money", "income", "salary", "debt", "savings", "broke", "paycheck", "bills", "client didn't pay",
    "freelance", "invoice", "rent",
];

const STABLE_PATTERN_MARKERS: &[&str] = &[
    "again", "every time", "as always", "same thing", "keeps happening", "over and over",
    "once more", "like always",
];

const TRADITION_MARKERS: &[&str] = &[
    "stoic", "stoicism", "epicur", "existential", "buddhis", "cynic", "aristot", "plato",
    "nietzsche", "camus", "kierkegaard", "seneca", "marcus aurelius", "epictetus",
];

const SWITCH_MARKERS: &[&str] = &[
    "different angle",
    "another angle",
    "other school",
    "different school",
    "another tradition",
    "different tradition",
    "another lens",
    "different lens",
    "from the",
    "through the",
    "the stoic way",
    "what would",
    "compare",
];

/// Phrases that block the philosophy-intent read: the person wants
/// practical help, not a framework tour.
const PHILOSOPHY_BLOCKERS: &[&str] = &[
    "no philosophy",
    "enough philosophy",
    "skip the philosophy",
    "without the philosophy",
    "spare me the",
];

const DIRECT_PHILOSOPHY: &[&str] = &[
    "what would the stoics say",
    "what does stoicism say",
    "philosophical take",
    "philosophically",
    "from a philosophical",
    "which school",
    "which tradition",
];

fn first_person_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(i|i'm|i've|me|my|myself|mine)\b").unwrap())
}

fn norm(text: &str) -> String {
    text.trim().to_lowercase()
}

/// True if any topic marker family matches. Used by the ambiguity gate
/// alongside the lens keyword scan.
pub fn has_topic_marker(text: &str) -> bool {
    let t = norm(text);
    SENSITIVE_MARKERS.iter().any(|m| t.contains(m))
        || FINANCIAL_MARKERS.iter().any(|m| t.contains(m))
        || TRADITION_MARKERS.iter().any(|m| t.contains(m))
        || FULL_Q_MARKERS.iter().any(|m| t.contains(m))
}

/// Count topic-marker hits across all marker families.
fn marker_hits(t: &str) -> usize {
    SENSITIVE_MARKERS
        .iter()
        .chain(FINANCIAL_MARKERS)
        .chain(TRADITION_MARKERS)
        .chain(FULL_Q_MARKERS)
        .filter(|m| t.contains(*m))
        .count()
}

/// Substantive input: long enough to work with, or a full question, or a
/// mid-length utterance with enough topic markers or a first-person
/// account over a topic keyword.
pub fn is_substantive(text: &str, thresholds: &Thresholds) -> bool {
    let t = norm(text);
    if t.is_empty() {
        return false;
    }
    let chars = t.chars().count();
    if chars >= thresholds.long_utterance_chars {
        return true;
    }
    if FULL_Q_MARKERS.iter().any(|m| t.contains(m)) && t.contains('?') {
        return true;
    }
    chars >= thresholds.marker_utterance_chars
        && (marker_hits(&t) >= thresholds.marker_min_hits
            || (first_person_re().is_match(&t)
                && (lenses::has_lens_keyword(&t) || has_topic_marker(&t))))
}

/// Full question with a recognizable question opener.
pub fn is_full_question(text: &str) -> bool {
    let t = norm(text);
    t.contains('?') && FULL_Q_MARKERS.iter().any(|m| t.contains(m))
}

/// Money-themed input ("client didn't pay again").
pub fn is_financial_pattern(text: &str) -> bool {
    let t = norm(text);
    FINANCIAL_MARKERS.iter().any(|m| t.contains(m))
}

/// Recurrence markers ("again", "every time"): a stable pattern rather
/// than a one-off event.
pub fn is_stable_pattern(text: &str) -> bool {
    let t = norm(text);
    STABLE_PATTERN_MARKERS.iter().any(|m| t.contains(m))
}

/// Sensitive life events that call for a sparser, gentler turn.
pub fn is_sensitive_topic(text: &str) -> bool {
    let t = norm(text);
    SENSITIVE_MARKERS.iter().any(|m| t.contains(m))
}

/// Religious/spiritual content: answered carefully, without a fork.
pub fn is_religious_topic(text: &str) -> bool {
    let t = norm(text);
    RELIGIOUS_MARKERS.iter().any(|m| {
        // "god" alone matches too eagerly inside other words; require a
        // word boundary for the three-letter markers.
        if m.len() <= 3 {
            t.split(|c: char| !c.is_alphanumeric()).any(|w| w == *m)
        } else {
            t.contains(m)
        }
    })
}

/// Request to reframe through a named tradition or a different school.
pub fn is_tradition_switch(text: &str) -> bool {
    let t = norm(text);
    let names_tradition = TRADITION_MARKERS.iter().any(|m| t.contains(m));
    let asks_switch = SWITCH_MARKERS.iter().any(|m| t.contains(m));
    names_tradition && asks_switch
}

/// Explicit philosophical framing request, not blocked by a "no
/// philosophy" qualifier.
pub fn is_philosophy_intent(text: &str) -> bool {
    let t = norm(text);
    if PHILOSOPHY_BLOCKERS.iter().any(|m| t.contains(m)) {
        return false;
    }
    t.contains("philosoph") || TRADITION_MARKERS.iter().any(|m| t.contains(m))
}

/// Direct "what would the stoics say" phrasing: bypasses warmup entirely.
pub fn is_direct_philosophy(text: &str) -> bool {
    let t = norm(text);
    if PHILOSOPHY_BLOCKERS.iter().any(|m| t.contains(m)) {
        return false;
    }
    DIRECT_PHILOSOPHY.iter().any(|m| t.contains(m))
}
