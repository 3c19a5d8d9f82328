//! Lens catalog and keyword router.
//!
//! A lens is a supporting topical frame attached to the generative call.
//! Selection is a cheap keyword scan: score each lens by marker hits, sort
//! by score (name as tiebreaker), take the top few. `General` is never
//! scored; it is the fallback when nothing matches.

use crate::domain::models::LensId;

/// Keyword markers per lens. Lowercase; matched as substrings of the
/// normalized utterance.
const LENS_KEYWORDS: &[(LensId, &[&str])] = &[
    (
        LensId::ControlScope,
        &[
            "chaos",
            "out of control",
            "everything is falling",
            "can't control",
            "overload",
            "overwhelmed",
            "uncertain",
            "anxiety",
        ],
    ),
    (
        LensId::MicroAgency,
        &[
            "can't start",
            "can't get started",
            "no energy",
            "apathy",
            "procrastinat",
            "doing nothing",
            "low energy",
        ],
    ),
    (
        LensId::Boundary,
        &[
            "pressure",
            "pressuring",
            "demanding",
            "demands",
            "boundar",
            "say no",
            "refuse",
            "expectations of others",
        ],
    ),
    (
        LensId::ExpectationGap,
        &[
            "expected",
            "was supposed to",
            "counted on",
            "disappoint",
            "didn't work out",
            "let down",
            "career",
        ],
    ),
    (
        LensId::FinanceRhythm,
        &[
            "in waves",
            "feast or famine",
            "income stream",
            "hunter",
            "reserve",
            "rhythm",
            "pause between",
            "wave income",
        ],
    ),
    (
        LensId::RolePosition,
        &[
            "how to act",
            "my position",
            "decision",
            "conflict",
            "responsibility",
            "take a stand",
        ],
    ),
    (
        LensId::Narrative,
        &[
            "i'm just like that",
            "always like this",
            "self-esteem",
            "identity",
            "my whole life",
            "story about me",
        ],
    ),
    (
        LensId::MortalityFocus,
        &[
            "running out of time",
            "life is passing",
            "meaning",
            "priorities",
            "won't make it in time",
            "the end",
        ],
    ),
];

/// Built-in lens material attached to generative instructions.
fn lens_material(lens: LensId) -> &'static str {
    match lens {
        LensId::ControlScope => {
            "Control scope: split the situation into what the person can \
             influence and what they cannot. Ground the reply in the \
             influenceable part; treat the rest as weather, not verdict."
        }
        LensId::MicroAgency => {
            "Micro-agency: one five-minute step that is possible today. Not \
             a plan for everything — a single move that restores the sense \
             of being able to act."
        }
        LensId::Boundary => {
            "Boundaries: one clear phrase of yes / no / not now. Saying no \
             to one thing is saying yes to another; a limit protects \
             attention rather than rejecting people."
        }
        LensId::ExpectationGap => {
            "Expectation gap: name what was expected and what actually \
             happened. Disappointment is the distance between the two, not \
             a judgment of the person."
        }
        LensId::FinanceRhythm => {
            "Financial rhythm: income in waves is a cycle with phases, not \
             a personal failure. A pause is part of the wave; a buffer and \
             a repeatable step matter more than a single windfall."
        }
        LensId::RolePosition => {
            "Role and position: participant, observer, or leader — which \
             role is the person occupying here, and which would they choose \
             deliberately?"
        }
        LensId::Narrative => {
            "Narrative: this is a chapter, not the whole book. Separate the \
             current episode from the identity conclusion drawn from it."
        }
        LensId::MortalityFocus => {
            "Time and choice: finitude makes priorities visible. Ask what \
             this week is for, not what a lifetime owes."
        }
        LensId::General => {
            "General: reflect the situation in plain terms, pick the single \
             most load-bearing tension, and address that one directly."
        }
    }
}

/// Owns the lens material passed to the generation collaborator.
#[derive(Debug, Clone, Default)]
pub struct LensCatalog;

impl LensCatalog {
    pub fn material(&self, lens: LensId) -> &'static str {
        lens_material(lens)
    }

    /// Join the material blocks for the given lenses.
    pub fn bundle(&self, lenses: &[LensId]) -> String {
        lenses
            .iter()
            .map(|lens| self.material(*lens))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        if ch.is_alphanumeric() || ch.is_whitespace() || ch == '-' || ch == '\'' {
            out.push(ch);
        } else {
            out.push(' ');
        }
    }
    out
}

/// True if any lens keyword appears in the utterance. Used by the
/// ambiguity gate: a topic keyword suppresses the orientation offer.
pub fn has_lens_keyword(text: &str) -> bool {
    let normalized = normalize(text);
    LENS_KEYWORDS
        .iter()
        .any(|(_, keywords)| keywords.iter().any(|kw| normalized.contains(kw)))
}

/// Select up to `max_lenses` lenses by keyword score. Falls back to
/// `ControlScope` when nothing matches: the broadest usable frame.
pub fn select_lenses(text: &str, max_lenses: usize) -> Vec<LensId> {
    let normalized = normalize(text);

    let mut scores: Vec<(LensId, usize)> = LENS_KEYWORDS
        .iter()
        .filter_map(|(lens, keywords)| {
            let score = keywords.iter().filter(|kw| normalized.contains(*kw)).count();
            (score > 0).then_some((*lens, score))
        })
        .collect();

    scores.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.as_str().cmp(b.0.as_str())));

    let selected: Vec<LensId> = scores.into_iter().take(max_lenses.max(1)).map(|(l, _)| l).collect();
    if selected.is_empty() {
        vec![LensId::ControlScope]
    } else {
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_by_keywords() {
        let lenses = select_lenses("everything is chaos, I feel overwhelmed and can't control it", 3);
        assert_eq!(lenses[0], LensId::ControlScope);
    }

    #[test]
    fn test_selection_is_capped() {
        let text = "chaos, no energy, boundaries, disappointment, meaning, conflict";
        let lenses = select_lenses(text, 3);
        assert!(lenses.len() <= 3);
        assert!(!lenses.is_empty());
    }

    #[test]
    fn test_fallback_when_nothing_matches() {
        let lenses = select_lenses("hello there", 3);
        assert_eq!(lenses, vec![LensId::ControlScope]);
    }

    #[test]
    fn test_deterministic_tiebreak() {
        let a = select_lenses("apathy and pressure everywhere", 2);
        let b = select_lenses("apathy and pressure everywhere", 2);
        assert_eq!(a, b);
    }

    #[test]
    fn test_has_lens_keyword() {
        assert!(has_lens_keyword("my life is chaos"));
        assert!(!has_lens_keyword("hi"));
    }

    #[test]
    fn test_catalog_bundle_joins_material() {
        let catalog = LensCatalog;
        let bundle = catalog.bundle(&[LensId::ControlScope, LensId::Boundary]);
        assert!(bundle.contains("Control scope"));
        assert!(bundle.contains("Boundaries"));
    }
}
