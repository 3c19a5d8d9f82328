//! Property tests for the response shaping pipeline.

use proptest::prelude::*;

use stoa::domain::models::{SessionState, Stage, Thresholds, TurnPlan};
use stoa::services::shaping::{Pipeline, ShapeContext};

fn run_pipeline(text: &str, max_questions: u8) -> String {
    let mut plan = TurnPlan::for_rule("residual");
    plan.max_questions = max_questions;
    let state = SessionState::default();
    let thresholds = Thresholds::default();
    let ctx = ShapeContext {
        plan: &plan,
        state: &state,
        thresholds: &thresholds,
        stage: Stage::Guidance,
        allow_choice_injection: false,
    };
    Pipeline.run(text, &ctx).text
}

/// Sentences assembled from a small word alphabet, each ending in a
/// period or a question mark.
fn arb_reply() -> impl Strategy<Value = String> {
    let sentence = (prop::collection::vec("[a-z]{2,9}", 2..9), prop::bool::ANY).prop_map(
        |(words, question)| {
            let mut s = format!("the {}", words.join(" "));
            s.push(if question { '?' } else { '.' });
            let mut chars = s.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => s,
            }
        },
    );
    prop::collection::vec(sentence, 1..12).prop_map(|sentences| sentences.join(" "))
}

proptest! {
    #[test]
    fn prop_pipeline_is_idempotent(reply in arb_reply(), max_questions in 0u8..3) {
        let once = run_pipeline(&reply, max_questions);
        let twice = run_pipeline(&once, max_questions);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_question_count_never_exceeds_budget(reply in arb_reply(), max_questions in 0u8..3) {
        let shaped = run_pipeline(&reply, max_questions);
        let questions = shaped.matches('?').count();
        prop_assert!(questions <= usize::from(max_questions));
    }

    #[test]
    fn prop_output_never_empty(reply in arb_reply(), max_questions in 0u8..3) {
        let shaped = run_pipeline(&reply, max_questions);
        prop_assert!(!shaped.trim().is_empty());
    }

    #[test]
    fn prop_output_respects_hard_cap(reply in arb_reply(), max_questions in 0u8..3) {
        let shaped = run_pipeline(&reply, max_questions);
        prop_assert!(shaped.chars().count() <= Thresholds::default().max_reply_chars);
    }
}
