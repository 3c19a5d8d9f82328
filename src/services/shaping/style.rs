//! Phrase and style guards.
//!
//! Removes stock-phrase sentences, drops banned templated openers when the
//! plan forbids them, and normalizes whitespace and enumeration breaks.

use std::sync::OnceLock;

use regex::Regex;

use crate::services::shaping::{split_sentences, ShapeContext};

/// Stock phrases that mark a sentence as filler regardless of position.
const STOCK_PHRASES: &[&str] = &[
    "it's important to remember",
    "it is important to remember",
    "at the end of the day",
    "everything happens for a reason",
    "life is a journey",
    "time heals all wounds",
    "just stay positive",
    "believe in yourself",
];

/// Templated openers that may not start a reply when templates are
/// disabled for the turn.
const BANNED_OPENERS: &[&str] = &[
    "i hear you",
    "i hear that",
    "that sounds really hard",
    "thank you for sharing",
    "thanks for sharing",
    "i understand how you feel",
    "great question",
    "that's a great question",
];

/// Apply phrase bans per the plan. Paragraph structure is preserved; the
/// opener ban only ever applies to the first sentence of the reply.
pub fn apply(text: &str, ctx: &ShapeContext<'_>) -> String {
    let mut opening_line = true;
    crate::services::shaping::map_paragraphs(text, |line| {
        let mut sentences: Vec<String> = split_sentences(line)
            .into_iter()
            .filter(|s| {
                let lowered = s.to_lowercase();
                !STOCK_PHRASES.iter().any(|p| lowered.contains(p))
            })
            .collect();

        if opening_line && ctx.plan.disable_templated_opening {
            while let Some(first) = sentences.first() {
                let lowered = first.to_lowercase();
                if BANNED_OPENERS.iter().any(|p| lowered.starts_with(p)) {
                    sentences.remove(0);
                } else {
                    break;
                }
            }
        }
        opening_line = false;

        sentences.join(" ")
    })
}

// A sentence terminator followed by a bullet or numbered marker marks an
// enumeration item that was emitted inline.
fn inline_enumeration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([.!?:…])[ \t]+([-•*] |\d{1,2}[.)] )").unwrap())
}

/// Collapse runs of blank lines, trim trailing spaces, and put inline
/// enumeration items on their own lines.
pub fn normalize_whitespace(text: &str) -> String {
    let text = inline_enumeration_re().replace_all(text, "$1\n$2");
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(trimmed);
    }
    out.trim().to_string()
}
