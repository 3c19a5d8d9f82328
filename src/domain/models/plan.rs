//! Turn plan: the per-turn decision record produced by the plan governor.
//!
//! A `TurnPlan` is created fresh for every turn, consumed by the content
//! dispatcher and the response shaping pipeline, and then discarded. It is
//! never persisted.

use crate::domain::models::session::Stage;

/// Flags-and-limits record controlling every downstream decision for one turn.
#[derive(Debug, Clone)]
pub struct TurnPlan {
    /// Name of the governor rule that produced this plan. Exactly one rule
    /// fires per turn; the name is carried into telemetry.
    pub rule: &'static str,
    /// Force a stage for this turn (and write it back to the session).
    pub stage_override: Option<Stage>,
    /// A fully formed canned reply; when set, the dispatcher returns it
    /// without touching the generation service.
    pub canned_reply: Option<String>,
    /// Suppress templated openings and warmup bridge patterns.
    pub disable_templated_opening: bool,
    /// The generative path must front-load the direct answer.
    pub require_answer_first: bool,
    /// Depth-first explanation of the prior turn's content.
    pub explain_mode: bool,
    /// Substantive multi-frame depth mode.
    pub depth_mode: bool,
    /// Narrow to a single guided frame: preview 2-3 candidate frames and
    /// offer a soft choice instead of answering broadly.
    pub force_guided_path: bool,
    /// Re-present the previously offered options instead of reclassifying.
    pub force_repeat_options: bool,
    /// Attach comparative topical examples to the generative call.
    pub allow_topic_examples: bool,
    /// Whether the coarse orientation question may be offered this turn.
    pub allow_orientation_offer: bool,
    /// Suppress the forced-choice closing line.
    pub disable_closing_choice: bool,
    /// Suppress fork-style follow-through offers entirely.
    pub disable_fork: bool,
    /// Skip the one-shot "shorter, more conversational" regeneration.
    pub disable_short_retry: bool,
    /// A templated bridge line may open the reply (content layer decides).
    pub add_bridge: bool,
    /// A lens named by the user on the next turn may be locked in.
    pub allow_topic_lock: bool,
    pub max_questions: u8,
    pub max_practices: u8,
    pub max_lenses: usize,
}

impl TurnPlan {
    /// Base plan for a governor rule, with spec defaults.
    pub fn for_rule(rule: &'static str) -> Self {
        Self {
            rule,
            stage_override: None,
            canned_reply: None,
            disable_templated_opening: false,
            require_answer_first: false,
            explain_mode: false,
            depth_mode: false,
            force_guided_path: false,
            force_repeat_options: false,
            allow_topic_examples: false,
            allow_orientation_offer: true,
            disable_closing_choice: false,
            disable_fork: false,
            disable_short_retry: false,
            add_bridge: false,
            allow_topic_lock: true,
            max_questions: 1,
            max_practices: 1,
            max_lenses: 3,
        }
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stage_override = Some(stage);
        self
    }

    /// Mark the plan answer-first. This is the hard invariant from the
    /// governor contract: answer-first implies no templated opening and no
    /// orientation offer, enforced here at construction time rather than
    /// left to downstream code.
    pub fn answer_first(mut self) -> Self {
        self.require_answer_first = true;
        self.enforce_invariants();
        self
    }

    /// Apply cross-flag implications. Idempotent; the governor calls this
    /// once more on the finished plan as a belt check.
    pub fn enforce_invariants(&mut self) {
        if self.require_answer_first {
            self.disable_templated_opening = true;
            self.allow_orientation_offer = false;
        }
        if self.explain_mode || self.depth_mode || self.force_guided_path {
            self.disable_closing_choice = true;
        }
        if self.canned_reply.is_some() {
            self.allow_orientation_offer = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let plan = TurnPlan::for_rule("residual");
        assert_eq!(plan.max_questions, 1);
        assert_eq!(plan.max_practices, 1);
        assert_eq!(plan.max_lenses, 3);
        assert!(plan.allow_orientation_offer);
        assert!(!plan.require_answer_first);
    }

    #[test]
    fn test_answer_first_implies_no_templates_or_orientation() {
        let plan = TurnPlan::for_rule("substantive").answer_first();
        assert!(plan.require_answer_first);
        assert!(plan.disable_templated_opening);
        assert!(!plan.allow_orientation_offer);
    }

    #[test]
    fn test_depth_mode_disables_closing_choice() {
        let mut plan = TurnPlan::for_rule("sensitive_topic");
        plan.depth_mode = true;
        plan.enforce_invariants();
        assert!(plan.disable_closing_choice);
    }

    #[test]
    fn test_enforce_invariants_is_idempotent() {
        let mut plan = TurnPlan::for_rule("substantive").answer_first();
        let before = format!("{plan:?}");
        plan.enforce_invariants();
        assert_eq!(before, format!("{plan:?}"));
    }
}
