//! Meta-commentary stripping.
//!
//! Generated text sometimes narrates itself: offers to continue "in this
//! format", asks whether to elaborate, or leaks internal tags. The first
//! stage drops trailing meta sentences; the final stage is a hard strip of
//! anything that survived intermediate transforms.

use crate::services::shaping::split_sentences;

const META_MARKERS: &[&str] = &[
    "in this format",
    "would you like me to continue",
    "shall i continue",
    "shall i go on",
    "want me to elaborate",
    "would you like me to elaborate",
    "let me know if you'd like",
    "let me know if you want",
    "i can break this down further if",
    "as an ai",
    "as a language model",
    "is there anything else",
];

const DEBUG_TAGS: &[&str] = &["[debug]", "[internal]", "[system]", "<thinking>", "</thinking>"];

fn is_meta(sentence: &str) -> bool {
    let s = sentence.to_lowercase();
    META_MARKERS.iter().any(|m| s.contains(m))
}

/// Drop trailing sentences that are meta-commentary. Interior content is
/// left alone here; the final strip handles the rest. Operates on the tail
/// of the text, draining emptied paragraphs upward.
pub fn strip_meta_tail(text: &str) -> String {
    let mut paragraphs: Vec<String> = text.split("\n\n").map(str::to_string).collect();
    while let Some(last) = paragraphs.last_mut() {
        let mut sentences = split_sentences(last);
        let before = sentences.len();
        while let Some(s) = sentences.last() {
            if is_meta(s) {
                sentences.pop();
            } else {
                break;
            }
        }
        if sentences.is_empty() {
            paragraphs.pop();
        } else {
            // An untouched paragraph keeps its line structure verbatim.
            if sentences.len() < before {
                *last = sentences.join(" ");
            }
            break;
        }
    }
    paragraphs.join("\n\n")
}

/// Hard strip: remove meta sentences anywhere and erase debug tags.
pub fn final_strip(text: &str) -> String {
    let mut out = crate::services::shaping::map_paragraphs(text, |p| {
        split_sentences(p)
            .into_iter()
            .filter(|s| !is_meta(s))
            .collect::<Vec<_>>()
            .join(" ")
    });
    for tag in DEBUG_TAGS {
        out = remove_tag_ci(&out, tag);
    }
    out.trim().to_string()
}

/// Case-insensitive tag removal. ASCII lowercasing keeps byte offsets
/// aligned between the haystack and its lowered copy.
fn remove_tag_ci(text: &str, tag: &str) -> String {
    let lowered = text.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut idx = 0;
    while let Some(pos) = lowered[idx..].find(tag) {
        out.push_str(&text[idx..idx + pos]);
        idx += pos + tag.len();
    }
    out.push_str(&text[idx..]);
    out
}
