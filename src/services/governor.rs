//! Plan governor.
//!
//! Single owner of per-turn conflict resolution. The rules live in one
//! explicit ordered list and are evaluated first-match-wins, so exactly one
//! rule fires per turn and the precedence is readable top to bottom. The
//! governor is deterministic: the only randomness in a turn (bridge pattern
//! choice, closing pool choice) is taken downstream, gated by plan flags
//! decided here from state alone.

use crate::domain::models::{
    IntentSignals, SessionState, Stage, Thresholds, TurnPlan,
};
use crate::services::canned;
use crate::services::classifiers::capability;

/// Context handed to each rule predicate/builder.
struct RuleCtx<'a> {
    state: &'a SessionState,
    utterance: &'a str,
    signals: &'a IntentSignals,
    thresholds: &'a Thresholds,
}

type Predicate = fn(&RuleCtx<'_>) -> bool;
type Builder = fn(&RuleCtx<'_>) -> TurnPlan;

/// Ordered precedence table. First predicate that returns true wins; the
/// residual rule's predicate is always true, so a plan is always produced.
const RULES: &[(&str, Predicate, Builder)] = &[
    ("capability", |c| c.signals.capability.matched, capability_plan),
    ("tradition_switch", |c| c.signals.tradition_switch, tradition_switch_plan),
    ("structure_demand", |c| c.signals.structure_demand, structure_plan),
    ("sensitive_topic", |c| c.signals.sensitive_topic, sensitive_plan),
    ("pragmatic", |c| {
        c.signals.pragmatic_irritation || c.signals.irritation_at_brevity
    }, pragmatic_plan),
    ("repeat_options", |c| {
        c.signals.short_ambiguous && c.state.last_offered_options.is_some()
    }, repeat_options_plan),
    ("expand", |c| c.signals.expand_request, expand_plan),
    ("substantive", |c| c.signals.substantive, substantive_plan),
    ("residual", |_| true, residual_plan),
];

/// Produce the turn plan. Never errors; falls through to the residual rule.
pub fn plan(
    state: &SessionState,
    utterance: &str,
    signals: &IntentSignals,
    thresholds: &Thresholds,
) -> TurnPlan {
    let ctx = RuleCtx {
        state,
        utterance,
        signals,
        thresholds,
    };

    for (name, predicate, builder) in RULES {
        if predicate(&ctx) {
            let mut plan = builder(&ctx);
            debug_assert_eq!(plan.rule, *name);
            apply_cross_cutting(&mut plan, &ctx);
            plan.enforce_invariants();
            return plan;
        }
    }
    unreachable!("residual rule matches everything")
}

/// Adjustments that apply regardless of which rule fired.
fn apply_cross_cutting(plan: &mut TurnPlan, ctx: &RuleCtx<'_>) {
    // Question cadence: every second guidance turn the reply carries no
    // question at all, so the conversation breathes.
    let stage = plan.stage_override.unwrap_or(ctx.state.stage);
    if stage == Stage::Guidance && ctx.state.guidance_turns % 2 == 1 {
        plan.max_questions = 0;
    }

    // Fork density: at most one forced-choice fork per three guidance turns.
    let since_fork =
        i64::from(ctx.state.turn_index) - ctx.state.cooldowns.last_fork_turn;
    if since_fork < i64::from(ctx.thresholds.fork_min_gap_turns) {
        plan.disable_fork = true;
    }
    if ctx.state.orientation_hold {
        plan.disable_fork = true;
        plan.disable_templated_opening = true;
    }

    // Active lock or a money-rhythm reading narrows to one lens.
    if ctx.state.active_lens().is_some()
        || (ctx.signals.financial_pattern && ctx.signals.stable_pattern)
    {
        plan.max_lenses = 1;
    }

    // A previous short guidance reply demands expansion this turn.
    if ctx.state.force_expand_next && plan.canned_reply.is_none() {
        plan.explain_mode = true;
    }
}

fn capability_plan(_ctx: &RuleCtx<'_>) -> TurnPlan {
    let mut plan = TurnPlan::for_rule("capability");
    plan.canned_reply = Some(capability::capability_reply());
    plan.disable_fork = true;
    plan.max_questions = 0;
    plan
}

fn tradition_switch_plan(_ctx: &RuleCtx<'_>) -> TurnPlan {
    let mut plan = TurnPlan::for_rule("tradition_switch").answer_first();
    plan.explain_mode = true;
    plan.depth_mode = true;
    plan.allow_topic_examples = true;
    plan
}

fn structure_plan(_ctx: &RuleCtx<'_>) -> TurnPlan {
    let mut plan = TurnPlan::for_rule("structure_demand").answer_first();
    plan.disable_fork = true;
    plan.max_questions = 0;
    plan
}

fn sensitive_plan(_ctx: &RuleCtx<'_>) -> TurnPlan {
    let mut plan = TurnPlan::for_rule("sensitive_topic").answer_first();
    plan.depth_mode = true;
    plan.disable_fork = true;
    plan.allow_topic_lock = false;
    plan
}

fn pragmatic_plan(ctx: &RuleCtx<'_>) -> TurnPlan {
    let mut plan = TurnPlan::for_rule("pragmatic").answer_first();
    plan.disable_fork = true;
    if ctx.signals.irritation_at_brevity {
        // Irritation at brevity means the short retry would make it worse.
        plan.disable_short_retry = true;
        plan.explain_mode = true;
    }
    plan
}

fn repeat_options_plan(_ctx: &RuleCtx<'_>) -> TurnPlan {
    let mut plan = TurnPlan::for_rule("repeat_options");
    plan.force_repeat_options = true;
    plan.disable_fork = true;
    plan.allow_orientation_offer = false;
    plan
}

fn expand_plan(_ctx: &RuleCtx<'_>) -> TurnPlan {
    let mut plan = TurnPlan::for_rule("expand").answer_first();
    plan.explain_mode = true;
    plan
}

fn substantive_plan(ctx: &RuleCtx<'_>) -> TurnPlan {
    let mut plan = TurnPlan::for_rule("substantive").answer_first().stage(Stage::Guidance);
    plan.depth_mode = ctx.signals.direct_philosophy;
    plan
}

fn residual_plan(ctx: &RuleCtx<'_>) -> TurnPlan {
    let mut plan = TurnPlan::for_rule("residual");

    let chars = ctx.utterance.chars().count();

    // Hard guards: long text and money themes never get warmup small talk.
    if chars >= ctx.thresholds.warmup_bypass_chars || ctx.signals.financial_pattern {
        plan = plan.stage(Stage::Guidance);
        plan.disable_templated_opening = true;
    }

    if ctx.signals.guidance_trigger || ctx.signals.direct_philosophy {
        plan = plan.stage(Stage::Guidance);
    }

    // Explicit philosophy intent on short input gets the guided path: show
    // candidate frames, let the person choose, lock the choice next turn.
    if ctx.signals.philosophy_intent
        && chars <= ctx.thresholds.guided_path_max_chars
        && ctx.state.active_lens().is_none()
    {
        plan.force_guided_path = true;
        plan = plan.stage(Stage::Guidance);
    }

    // Confusion and term questions are answered example-first.
    if let Some(term) = ctx.signals.term_question {
        plan.canned_reply = Some(canned::term_reply(term));
    }
    if ctx.signals.confusion || ctx.signals.term_question.is_some() {
        plan.disable_fork = true;
        plan.max_questions = 0;
        plan.disable_templated_opening = true;
    }

    // Warmup bridges only when the cooldown allows. The actual pattern
    // choice (and the roll) happens in the content layer.
    if ctx.state.stage == Stage::Warmup && plan.stage_override.is_none() {
        let since_bridge =
            i64::from(ctx.state.turn_index) - ctx.state.cooldowns.last_bridge_turn;
        plan.add_bridge = since_bridge >= i64::from(ctx.thresholds.bridge_cooldown_turns);
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{SessionState, Thresholds};
    use crate::services::classifiers;

    fn plan_for(text: &str, state: &SessionState) -> TurnPlan {
        let thresholds = Thresholds::default();
        let signals = classifiers::classify_all(text, state, &thresholds);
        plan(state, text, &signals, &thresholds)
    }

    #[test]
    fn test_exactly_one_rule_fires() {
        let state = SessionState::default();
        // Capability outranks structure demand even when both match.
        let text = "What can you do? What features do you have? Give me steps, no filler.";
        let p = plan_for(text, &state);
        assert_eq!(p.rule, "capability");
        assert!(p.canned_reply.is_some());
    }

    #[test]
    fn test_structure_demand_is_answer_first() {
        let state = SessionState::default();
        let p = plan_for("just give me steps, no filler", &state);
        assert_eq!(p.rule, "structure_demand");
        assert!(p.require_answer_first);
        assert!(p.disable_templated_opening);
        assert!(!p.allow_orientation_offer);
        assert_eq!(p.max_questions, 0);
    }

    #[test]
    fn test_substantive_is_answer_first_without_orientation() {
        let state = SessionState::default();
        let text = "Why does it make sense to keep pushing at work when every project \
                    gets cancelled halfway and nothing I finish seems to matter to anyone?";
        let p = plan_for(text, &state);
        assert_eq!(p.rule, "substantive");
        assert!(p.require_answer_first);
        assert!(!p.allow_orientation_offer);
    }

    #[test]
    fn test_residual_orientation_allowed_on_vague_input() {
        let state = SessionState::default();
        let p = plan_for("i feel bad", &state);
        assert_eq!(p.rule, "residual");
        assert!(p.allow_orientation_offer);
    }

    #[test]
    fn test_financial_hard_guard_skips_warmup() {
        let state = SessionState::default();
        let p = plan_for("the money ran out", &state);
        assert_eq!(p.stage_override, Some(Stage::Guidance));
        assert!(p.disable_templated_opening);
    }

    #[test]
    fn test_repeat_options_needs_stored_options() {
        let mut state = SessionState::default();
        state.turn_index = 3;
        state.pending_followthrough = Some(crate::domain::models::PendingFollowThrough {
            kind: crate::domain::models::FollowThroughKind::ForcedChoice,
            prompt: "one or two?".to_string(),
            options: vec!["one".to_string(), "two".to_string()],
            default: Some("one".to_string()),
            created_turn: 2,
        });
        state.last_offered_options = Some(vec!["one".to_string(), "two".to_string()]);

        let p = plan_for("both", &state);
        assert_eq!(p.rule, "repeat_options");
        assert!(p.force_repeat_options);
    }

    #[test]
    fn test_question_cadence_zeroes_questions() {
        let mut state = SessionState::default();
        state.stage = Stage::Guidance;
        state.guidance_turns = 1;
        let text = "Why does it make sense to keep pushing at work when every project \
                    gets cancelled halfway and nothing I finish seems to matter to anyone?";
        let p = plan_for(text, &state);
        assert_eq!(p.max_questions, 0);
    }

    #[test]
    fn test_active_lock_narrows_lenses() {
        let mut state = SessionState::default();
        state.stage = Stage::Guidance;
        state.lock_topic(crate::domain::models::LensId::Boundary, 3);
        let text = "Why do I keep saying yes to everything my manager asks for even \
                    when the calendar is already bursting and my own work slips away?";
        let p = plan_for(text, &state);
        assert_eq!(p.max_lenses, 1);
    }

    #[test]
    fn test_fork_density_guard() {
        let mut state = SessionState::default();
        state.stage = Stage::Guidance;
        state.turn_index = 5;
        state.cooldowns.last_fork_turn = 4;
        let p = plan_for("i feel bad", &state);
        assert!(p.disable_fork);
    }

    #[test]
    fn test_determinism() {
        let mut state = SessionState::default();
        state.stage = Stage::Warmup;
        let a = plan_for("hello there", &state);
        let b = plan_for("hello there", &state);
        assert_eq!(format!("{a:?}"), format!("{b:?}"));
    }

    #[test]
    fn test_sensitive_topic_disables_fork_and_lock() {
        let state = SessionState::default();
        let p = plan_for("my divorce is finalizing and I can't think straight", &state);
        assert_eq!(p.rule, "sensitive_topic");
        assert!(p.disable_fork);
        assert!(!p.allow_topic_lock);
        assert!(p.disable_closing_choice);
    }
}
