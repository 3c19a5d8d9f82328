//! Single-topic guided path.
//!
//! Instead of answering a broad question broadly, preview two or three
//! candidate frames and offer one soft choice. A naming reply on the next
//! turn locks the chosen lens for a few guidance turns.

use crate::domain::models::LensId;
use crate::services::lenses;

/// Candidate frames offered in a preview. The preview set is intentionally
/// small and stable; the full catalog stays available to generation.
const PREVIEW_LENSES: &[LensId] = &[LensId::ControlScope, LensId::Boundary, LensId::MicroAgency];

fn preview_line(lens: LensId) -> &'static str {
    match lens {
        LensId::ControlScope => {
            "what here is actually yours to influence, and what is weather"
        }
        LensId::Boundary => "where a clear yes / no / not now would change the picture",
        LensId::MicroAgency => "one small move today that restores the sense of being able to act",
        _ => "the single most load-bearing tension in what you described",
    }
}

fn choice_word(lens: LensId) -> &'static str {
    match lens {
        LensId::ControlScope => "control",
        LensId::Boundary => "boundaries",
        LensId::MicroAgency => "step",
        _ => "general",
    }
}

/// Render the preview reply: up to three one-line frames plus a soft
/// choice question. Relevant lenses (by keyword) come first.
pub fn render_preview(utterance: &str) -> (String, Vec<LensId>) {
    let mut ordered: Vec<LensId> = lenses::select_lenses(utterance, 2)
        .into_iter()
        .filter(|l| PREVIEW_LENSES.contains(l))
        .collect();
    for lens in PREVIEW_LENSES {
        if !ordered.contains(lens) {
            ordered.push(*lens);
        }
    }
    ordered.truncate(3);

    let mut out = String::from("There are a few angles we could take this from:\n");
    for lens in &ordered {
        out.push_str(&format!("- {}\n", preview_line(*lens)));
    }
    out.push_str(&format!(
        "\nWhich one is closer — {}?",
        ordered
            .iter()
            .map(|l| choice_word(*l))
            .collect::<Vec<_>>()
            .join(", ")
    ));

    (out, ordered)
}

/// Choice words offered for a preview, in order. Stored in the session so
/// the next turn can resolve a naming reply.
pub fn choice_words(offered: &[LensId]) -> Vec<String> {
    offered.iter().map(|l| choice_word(*l).to_string()).collect()
}

/// Map a stored choice word back to its lens.
pub fn lens_for_word(word: &str) -> Option<LensId> {
    match word {
        "control" => Some(LensId::ControlScope),
        "boundaries" => Some(LensId::Boundary),
        "step" => Some(LensId::MicroAgency),
        _ => None,
    }
}

/// Read a naming reply against the previewed lenses. Keyword-based; a
/// reply that names nothing returns `None` and the turn proceeds normally.
pub fn detect_choice(text: &str, offered: &[LensId]) -> Option<LensId> {
    let t = text.trim().to_lowercase();
    if t.is_empty() {
        return None;
    }
    for lens in offered {
        let word = choice_word(*lens);
        if t.contains(word) {
            return Some(*lens);
        }
    }
    // Positional replies: "the first one", "second".
    let positional: &[(&str, usize)] = &[
        ("first", 0),
        ("1", 0),
        ("second", 1),
        ("2", 1),
        ("third", 2),
        ("3", 2),
    ];
    for (marker, idx) in positional {
        if t.split_whitespace().any(|w| w.trim_matches(|c: char| !c.is_alphanumeric()) == *marker) {
            return offered.get(*idx).copied();
        }
    }
    None
}
