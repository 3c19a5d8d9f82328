//! Practice pacing and the recommendation pause.
//!
//! An actionable exercise ("try this for five minutes, write down...") may
//! appear at most once per cooldown window; under cooldown the prescriptive
//! sentences are stripped. A detected book/author recommendation closes the
//! turn softly: no questions, and the controller arms a pause so the next
//! turns don't pile suggestions on top of it.

use crate::services::shaping::{map_paragraphs, split_sentences, ShapeContext};

const PRACTICE_MARKERS: &[&str] = &[
    "try this",
    "try it for",
    "exercise:",
    "for five minutes",
    "for ten minutes",
    "write down",
    "jot down",
    "set a timer",
    "before you go to bed",
    "tomorrow morning, do",
    "practice this",
];

const RECOMMENDATION_MARKERS: &[&str] = &[
    "i'd recommend reading",
    "i recommend reading",
    "worth reading",
    "the book",
    "a book by",
    "meditations by marcus aurelius",
    "letters from a stoic",
    "man's search for meaning",
    "seneca's letters",
];

/// Result of the practice stage.
pub struct PracticeOutcome {
    pub text: String,
    /// The surviving text still prescribes an exercise.
    pub contains_practice: bool,
    /// A recommendation was detected; close softly, no questions.
    pub recommendation_pause: bool,
}

fn is_practice_sentence(sentence: &str) -> bool {
    let s = sentence.to_lowercase();
    PRACTICE_MARKERS.iter().any(|m| s.contains(m))
}

fn has_recommendation(text: &str) -> bool {
    let t = text.to_lowercase();
    RECOMMENDATION_MARKERS.iter().any(|m| t.contains(m))
}

/// Apply practice pacing for one turn.
pub fn apply(text: &str, ctx: &ShapeContext<'_>) -> PracticeOutcome {
    let under_cooldown = ctx.state.cooldowns.practice_turns > 0;
    let max_practices = usize::from(ctx.plan.max_practices);

    let mut kept_practices = 0usize;
    let out = map_paragraphs(text, |line| {
        split_sentences(line)
            .into_iter()
            .filter(|s| {
                if !is_practice_sentence(s) {
                    return true;
                }
                if under_cooldown || kept_practices >= max_practices {
                    return false;
                }
                kept_practices += 1;
                true
            })
            .collect::<Vec<_>>()
            .join(" ")
    });

    PracticeOutcome {
        recommendation_pause: has_recommendation(&out),
        contains_practice: kept_practices > 0,
        text: out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{SessionState, Stage, Thresholds, TurnPlan};

    fn ctx_with<'a>(
        plan: &'a TurnPlan,
        state: &'a SessionState,
        thresholds: &'a Thresholds,
    ) -> ShapeContext<'a> {
        ShapeContext {
            plan,
            state,
            thresholds,
            stage: Stage::Guidance,
            allow_choice_injection: false,
        }
    }

    const PRACTICE_TEXT: &str =
        "The pattern is avoidance, not laziness. Try this for five minutes: \
         name the smallest piece. Write down the first sentence only. The \
         rest can wait.";

    #[test]
    fn test_practice_stripped_under_cooldown() {
        let plan = TurnPlan::for_rule("residual");
        let mut state = SessionState::default();
        state.cooldowns.practice_turns = 2;
        let thresholds = Thresholds::default();
        let ctx = ctx_with(&plan, &state, &thresholds);

        let outcome = apply(PRACTICE_TEXT, &ctx);
        assert!(!outcome.text.to_lowercase().contains("try this"));
        assert!(!outcome.text.to_lowercase().contains("write down"));
        assert!(outcome.text.contains("avoidance"));
        assert!(!outcome.contains_practice);
    }

    #[test]
    fn test_practice_budget_keeps_first_only() {
        let plan = TurnPlan::for_rule("residual");
        let state = SessionState::default();
        let thresholds = Thresholds::default();
        let ctx = ctx_with(&plan, &state, &thresholds);

        let outcome = apply(PRACTICE_TEXT, &ctx);
        assert!(outcome.text.to_lowercase().contains("try this"));
        assert!(!outcome.text.to_lowercase().contains("write down"));
        assert!(outcome.contains_practice);
    }

    #[test]
    fn test_recommendation_sets_pause() {
        let plan = TurnPlan::for_rule("residual");
        let state = SessionState::default();
        let thresholds = Thresholds::default();
        let ctx = ctx_with(&plan, &state, &thresholds);

        let text = "If this thread interests you, the book Letters from a Stoic \
                    covers it with more patience than I can here.";
        let outcome = apply(text, &ctx);
        assert!(outcome.recommendation_pause);
    }

    #[test]
    fn test_plain_text_untouched() {
        let plan = TurnPlan::for_rule("residual");
        let state = SessionState::default();
        let thresholds = Thresholds::default();
        let ctx = ctx_with(&plan, &state, &thresholds);

        let text = "No prescriptions here. Only a description of the knot.";
        let outcome = apply(text, &ctx);
        assert_eq!(outcome.text, text);
        assert!(!outcome.contains_practice);
        assert!(!outcome.recommendation_pause);
    }
}
