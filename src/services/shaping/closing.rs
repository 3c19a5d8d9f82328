//! Forced-choice closing injection.
//!
//! When the turn has question budget left and forks are allowed, the reply
//! closes on a two-way choice. The injected choice is returned alongside
//! the text so the controller can store it as the pending follow-through.

use rand::seq::SliceRandom;

use crate::domain::models::Stage;
use crate::services::shaping::{questions, InjectedChoice, ShapeContext};

struct ChoiceTemplate {
    prompt: &'static str,
    options: [&'static str; 2],
}

const CHOICES: &[ChoiceTemplate] = &[
    ChoiceTemplate {
        prompt: "Do you want to go deeper into this thread, or widen out to the bigger picture?",
        options: ["deeper", "wider"],
    },
    ChoiceTemplate {
        prompt: "Should we stay with how this feels, or move to what you could do about it?",
        options: ["how it feels", "what to do"],
    },
    ChoiceTemplate {
        prompt: "Want to keep unpacking this one, or is there a second thread pressing harder?",
        options: ["keep unpacking", "second thread"],
    },
];

fn already_closed_with_choice(text: &str) -> bool {
    let trimmed = text.trim_end();
    CHOICES.iter().any(|c| trimmed.ends_with(c.prompt))
}

/// Inject a closing choice if the turn allows one. Returns the amended text
/// and the choice data, or `None` when no injection happens.
pub fn inject(
    text: &str,
    ctx: &ShapeContext<'_>,
    max_questions: u8,
) -> Option<(String, InjectedChoice)> {
    if ctx.stage != Stage::Guidance
        || ctx.plan.disable_closing_choice
        || ctx.plan.disable_fork
        || max_questions == 0
    {
        return None;
    }
    if already_closed_with_choice(text) {
        return None;
    }
    // Budget: injecting must not push the reply over its question cap.
    if questions::count(text) >= usize::from(max_questions) {
        return None;
    }

    let mut rng = rand::thread_rng();
    let template = CHOICES.choose(&mut rng)?;
    let amended = format!("{}\n\n{}", text.trim_end(), template.prompt);
    let choice = InjectedChoice {
        prompt: template.prompt.to_string(),
        options: template.options.iter().map(|o| (*o).to_string()).collect(),
        default: template.options[0].to_string(),
    };
    Some((amended, choice))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{SessionState, Thresholds, TurnPlan};

    fn ctx_with<'a>(
        plan: &'a TurnPlan,
        state: &'a SessionState,
        thresholds: &'a Thresholds,
        stage: Stage,
    ) -> ShapeContext<'a> {
        ShapeContext {
            plan,
            state,
            thresholds,
            stage,
            allow_choice_injection: true,
        }
    }

    const BASE: &str = "A reply with no questions in it. It states things plainly.";

    #[test]
    fn test_injects_when_budget_allows() {
        let plan = TurnPlan::for_rule("residual");
        let state = SessionState::default();
        let thresholds = Thresholds::default();
        let ctx = ctx_with(&plan, &state, &thresholds, Stage::Guidance);

        let (amended, choice) = inject(BASE, &ctx, 1).expect("should inject");
        assert!(amended.ends_with(&choice.prompt));
        assert_eq!(choice.options.len(), 2);
        assert_eq!(questions::count(&amended), 1);
    }

    #[test]
    fn test_no_injection_when_budget_spent() {
        let plan = TurnPlan::for_rule("residual");
        let state = SessionState::default();
        let thresholds = Thresholds::default();
        let ctx = ctx_with(&plan, &state, &thresholds, Stage::Guidance);

        let text = "A statement. And which part is yours?";
        assert!(inject(text, &ctx, 1).is_none());
    }

    #[test]
    fn test_no_injection_outside_guidance() {
        let plan = TurnPlan::for_rule("residual");
        let state = SessionState::default();
        let thresholds = Thresholds::default();
        let ctx = ctx_with(&plan, &state, &thresholds, Stage::Warmup);

        assert!(inject(BASE, &ctx, 1).is_none());
    }

    #[test]
    fn test_fork_flag_blocks_injection() {
        let mut plan = TurnPlan::for_rule("residual");
        plan.disable_fork = true;
        let state = SessionState::default();
        let thresholds = Thresholds::default();
        let ctx = ctx_with(&plan, &state, &thresholds, Stage::Guidance);

        assert!(inject(BASE, &ctx, 1).is_none());
    }

    #[test]
    fn test_injection_not_repeated() {
        let plan = TurnPlan::for_rule("residual");
        let state = SessionState::default();
        let thresholds = Thresholds::default();
        let ctx = ctx_with(&plan, &state, &thresholds, Stage::Guidance);

        let (amended, _) = inject(BASE, &ctx, 1).expect("first injection");
        assert!(inject(&amended, &ctx, 2).is_none());
    }
}
