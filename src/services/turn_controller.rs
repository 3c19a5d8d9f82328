//! Turn controller.
//!
//! Drives one user turn end to end: gate checks, classification, planning,
//! content production, shaping, state mutation, persistence, telemetry.
//! This is the only place session state is mutated; everything downstream
//! of the store handle is read-only collaborators.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::models::{
    FollowThroughKind, LensId, PendingFollowThrough, SessionState, Stage, Strategy, Thresholds,
    TurnPlan, TurnRecord, TurnReply,
};
use crate::domain::ports::{StateRepository, TelemetrySink};
use crate::services::canned;
use crate::services::classifiers::{self, gates, safety};
use crate::services::dispatcher::{ContentDispatcher, DispatchOutcome};
use crate::services::governor;
use crate::services::guided_path;
use crate::services::injection;
use crate::services::session_store::SessionStore;
use crate::services::shaping::{self, Pipeline, ShapeContext, Shaped};

/// Orientation zones offered on vague input, with the lens each maps to.
const ZONES: &[(&str, &[&str], LensId)] = &[
    ("work and money", &["work", "money", "job", "career"], LensId::FinanceRhythm),
    ("people", &["people", "relationship", "relationships", "family", "friend"], LensId::Boundary),
    ("self", &["myself", "self", "me", "feel", "identity"], LensId::Narrative),
];

pub struct TurnController {
    store: Arc<SessionStore>,
    dispatcher: ContentDispatcher,
    pipeline: Pipeline,
    repository: Arc<dyn StateRepository>,
    telemetry: Arc<dyn TelemetrySink>,
    thresholds: Thresholds,
}

impl TurnController {
    pub fn new(
        store: Arc<SessionStore>,
        dispatcher: ContentDispatcher,
        repository: Arc<dyn StateRepository>,
        telemetry: Arc<dyn TelemetrySink>,
        thresholds: Thresholds,
    ) -> Self {
        Self {
            store,
            dispatcher,
            pipeline: Pipeline,
            repository,
            telemetry,
            thresholds,
        }
    }

    /// Process one turn. Never errors: every failure mode inside degrades
    /// to a usable reply.
    pub async fn process_turn(&self, conversation_id: &str, input: &str) -> TurnReply {
        let trimmed = input.trim();

        let entry = self.store.handle(conversation_id).await;
        let mut state = entry.lock_owned().await;

        if trimmed.is_empty() {
            let record = self.record(conversation_id, &state, "empty_input", Strategy::Canned, &[], false, 0, canned::EMPTY_INPUT_PROMPT);
            self.telemetry.record(&record);
            return TurnReply {
                text: canned::EMPTY_INPUT_PROMPT.to_string(),
                stage: state.stage,
                record,
            };
        }

        // Safety outranks everything and never persists as stored stage.
        if safety::is_safety_risk(trimmed) {
            state.turn_index += 1;
            state.message_count += 1;
            let reply = safety::safe_response();
            state.record_exchange(trimmed, &reply, self.thresholds.history_cap);
            let record = self.record(conversation_id, &state, "safety", Strategy::Canned, &[], false, trimmed.chars().count(), &reply);
            drop(state);
            self.persist().await;
            self.telemetry.record(&record);
            return TurnReply {
                text: reply,
                stage: Stage::Safety,
                record,
            };
        }

        state.turn_index += 1;
        state.message_count += 1;
        let orientation_hold_at_start = state.orientation_hold;

        // First contact with an explicitly reflective ask skips warmup.
        if state.message_count == 1
            && (classifiers::topics::is_direct_philosophy(trimmed)
                || gates::is_guidance_trigger(trimmed))
        {
            state.stage = Stage::Guidance;
        }

        // A short accepting reply resolves a live follow-through in favor
        // of its default; expiry clears it silently instead.
        let mut resumed: Option<String> = None;
        if gates::is_accept(trimmed)
            && state.followthrough_live(self.thresholds.followthrough_expiry_turns)
        {
            if let Some(pending) = state.pending_followthrough.take() {
                let chosen = pending
                    .default
                    .clone()
                    .or_else(|| pending.options.first().cloned())
                    .unwrap_or_else(|| pending.prompt.clone());
                debug!(%chosen, "resuming follow-through");
                state.last_offered_options = None;
                resumed = Some(chosen);
            }
        }

        // Orientation choice resolution: last turn offered zones, this
        // reply names one.
        if state.pending_orientation {
            state.pending_orientation = false;
            if let Some(lens) = zone_choice(trimmed) {
                state.stage = Stage::Guidance;
                state.orientation_hold = true;
                state.lock_topic(lens, self.thresholds.topic_lock_turns);
                info!(lens = lens.as_str(), "orientation zone chosen");
            }
        }

        // Guided-path lock: a naming reply on the turn after a preview
        // locks the chosen lens.
        if state.last_preview_turn == Some(state.turn_index.saturating_sub(1)) {
            let offered: Vec<LensId> = state
                .last_offered_options
                .clone()
                .unwrap_or_default()
                .iter()
                .filter_map(|w| guided_path::lens_for_word(w))
                .collect();
            if let Some(lens) = guided_path::detect_choice(trimmed, &offered) {
                state.lock_topic(lens, self.thresholds.topic_lock_turns);
                state.last_offered_options = None;
                state.stage = Stage::Guidance;
                info!(lens = lens.as_str(), "guided path lens locked");
            }
            state.last_preview_turn = None;
        }

        let signals = classifiers::classify_all(trimmed, &state, &self.thresholds);
        let mut plan = if let Some(chosen) = &resumed {
            resume_plan(chosen)
        } else {
            governor::plan(&state, trimmed, &signals, &self.thresholds)
        };
        if orientation_hold_at_start {
            plan.disable_fork = true;
            plan.disable_templated_opening = true;
        }
        debug!(rule = plan.rule, stage = ?plan.stage_override, "plan ready");

        // Orientation offer: residual-only, vague input, nothing pending.
        if plan.rule == "residual"
            && plan.allow_orientation_offer
            && signals.ambiguous
            && !state.followthrough_pending(self.thresholds.followthrough_expiry_turns)
        {
            state.pending_orientation = true;
            return self
                .finish_turn(
                    conversation_id,
                    state,
                    trimmed,
                    &plan,
                    orientation_hold_at_start,
                    DispatchOutcome {
                        text: canned::ORIENTATION_PROMPT.to_string(),
                        strategy: Strategy::Canned,
                        lenses: Vec::new(),
                        regen: None,
                        used_bridge: false,
                        previewed: None,
                    },
                    false,
                )
                .await;
        }

        let effective_input = match &resumed {
            Some(chosen) => format!("{} — continue with: {chosen}", state.last_user_text),
            None => trimmed.to_string(),
        };

        let mut outcome = self.dispatcher.dispatch(&plan, &effective_input, &state).await;

        // Topical injection, rate-limited, generative replies only.
        if outcome.strategy == Strategy::Generative
            && injection::should_inject(&state, &self.thresholds)
        {
            let lens = outcome.lenses.first().copied().unwrap_or(LensId::General);
            outcome.text = injection::insert_line(&outcome.text, lens);
            state.cooldowns.last_injection_turn = i64::from(state.turn_index);
        }

        self.finish_turn(
            conversation_id,
            state,
            trimmed,
            &plan,
            orientation_hold_at_start,
            outcome,
            resumed.is_some(),
        )
        .await
    }

    /// Shape the produced content, apply all state mutations for the turn,
    /// persist, and emit telemetry.
    #[allow(clippy::too_many_arguments)]
    async fn finish_turn(
        &self,
        conversation_id: &str,
        mut state: tokio::sync::OwnedMutexGuard<SessionState>,
        user_text: &str,
        plan: &TurnPlan,
        orientation_hold_at_start: bool,
        outcome: DispatchOutcome,
        resumed: bool,
    ) -> TurnReply {
        let stage = plan.stage_override.unwrap_or(state.stage);

        let shaped = self.shape(&outcome, plan, &state, stage).await;
        let regenerated = shaped.1;
        let shaped = shaped.0;

        // Stage write-back; the safety stage never lands here.
        if let Some(next) = plan.stage_override {
            if next != Stage::Safety {
                state.stage = next;
            }
        }

        if let Some(choice) = &shaped.injected_choice {
            state.pending_followthrough = Some(PendingFollowThrough {
                kind: FollowThroughKind::ForcedChoice,
                prompt: choice.prompt.clone(),
                options: choice.options.clone(),
                default: Some(choice.default.clone()),
                created_turn: state.turn_index,
            });
            state.last_offered_options = Some(choice.options.clone());
            state.cooldowns.last_fork_turn = i64::from(state.turn_index);
        }

        if let Some(previewed) = &outcome.previewed {
            state.last_preview_turn = Some(state.turn_index);
            state.last_offered_options = Some(guided_path::choice_words(previewed));
        }

        if shaped.contains_practice {
            state.cooldowns.practice_turns = self.thresholds.practice_cooldown_turns;
        } else if shaped.recommendation_pause {
            state.cooldowns.practice_turns = state.cooldowns.practice_turns.max(2);
        }

        if outcome.used_bridge {
            state.cooldowns.last_bridge_turn = i64::from(state.turn_index);
        }

        if state.stage == Stage::Guidance {
            state.guidance_turns += 1;
            state.tick_topic_lock();
            if !shaped.contains_practice && !shaped.recommendation_pause {
                state.tick_practice_cooldown();
            }
            state.force_expand_next = outcome.strategy == Strategy::Generative
                && !resumed
                && shaped.text.chars().count() < self.thresholds.short_reply_expand_chars;
        } else {
            state.force_expand_next = false;
        }

        if orientation_hold_at_start {
            state.orientation_hold = false;
        }

        let mut final_text = shaped.text;

        // Occasional interest-profile suggestion, appended after the body.
        state.interest.record(&outcome.lenses);
        if let Some(suggestion) = self.suggestion(&state) {
            final_text.push_str(&suggestion);
            state.cooldowns.last_suggest_turn = i64::from(state.turn_index);
        }

        state.record_exchange(user_text, &final_text, self.thresholds.history_cap);

        let record = self.record(
            conversation_id,
            &state,
            plan.rule,
            outcome.strategy,
            &outcome.lenses,
            regenerated,
            user_text.chars().count(),
            &final_text,
        );
        let stage_out = state.stage;
        drop(state);

        self.persist().await;
        self.telemetry.record(&record);

        TurnReply {
            text: final_text,
            stage: stage_out,
            record,
        }
    }

    /// Run the shaping pipeline, with at most one regeneration. The rerun
    /// after a regeneration disables choice injection so the pipeline
    /// output is stable.
    async fn shape(
        &self,
        outcome: &DispatchOutcome,
        plan: &TurnPlan,
        state: &SessionState,
        stage: Stage,
    ) -> (Shaped, bool) {
        let ctx = ShapeContext {
            plan,
            state,
            thresholds: &self.thresholds,
            stage,
            allow_choice_injection: outcome.strategy == Strategy::Generative
                && !state.followthrough_pending(self.thresholds.followthrough_expiry_turns),
        };
        let shaped = self.pipeline.run(&outcome.text, &ctx);
        if !shaped.needs_regeneration || outcome.strategy != Strategy::Generative {
            return (shaped, false);
        }

        let Some(regen) = &outcome.regen else {
            return (shaped, false);
        };
        debug!("reply judged incomplete, regenerating once");
        let retry_text = self.dispatcher.regenerate(regen).await;
        let retry_ctx = ShapeContext {
            allow_choice_injection: false,
            ..ctx
        };
        let mut reshaped = self.pipeline.run(&retry_text, &retry_ctx);
        // A retry that still dangles is sealed on a sentence boundary
        // rather than shipped mid-sentence.
        if reshaped.needs_regeneration {
            reshaped.text = shaping::completion::force_terminal(&reshaped.text);
            reshaped.needs_regeneration = false;
        }
        (reshaped, true)
    }

    fn suggestion(&self, state: &SessionState) -> Option<String> {
        if state.interest.turns < self.thresholds.suggest_min_turns {
            return None;
        }
        let since = i64::from(state.turn_index) - state.cooldowns.last_suggest_turn;
        if since < i64::from(self.thresholds.suggest_cooldown_turns) {
            return None;
        }
        let (lens_name, share) = state.interest.dominant()?;
        if share < self.thresholds.suggest_min_confidence {
            return None;
        }
        Some(format!(
            "\n\nA side note: across our conversations, the {} angle keeps \
             pulling the most weight. If you ever want, we can give it a \
             dedicated pass.",
            lens_name.replace('_', " ")
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &self,
        conversation_id: &str,
        state: &SessionState,
        rule: &str,
        strategy: Strategy,
        lenses: &[LensId],
        regenerated: bool,
        input_chars: usize,
        output: &str,
    ) -> TurnRecord {
        TurnRecord {
            turn_id: Uuid::new_v4(),
            conversation_id: conversation_id.to_string(),
            turn_index: state.turn_index,
            stage: state.stage,
            rule: rule.to_string(),
            strategy,
            lenses: lenses.iter().map(|l| l.as_str().to_string()).collect(),
            regenerated,
            input_chars,
            output_chars: output.chars().count(),
            timestamp: Utc::now(),
        }
    }

    /// Persist the full snapshot. Failures are logged and swallowed; a
    /// turn never fails because the disk did.
    async fn persist(&self) {
        let snapshot = self.store.snapshot().await;
        if let Err(error) = self.repository.save(&snapshot).await {
            warn!(%error, "state persistence failed, continuing");
        }
    }
}

fn resume_plan(_chosen: &str) -> TurnPlan {
    let mut plan = TurnPlan::for_rule("resume_followthrough").answer_first();
    plan.explain_mode = true;
    plan.disable_fork = true;
    plan.enforce_invariants();
    plan
}

fn zone_choice(text: &str) -> Option<LensId> {
    let t = text.trim().to_lowercase();
    for (_, keywords, lens) in ZONES {
        if keywords.iter().any(|k| {
            t.split(|c: char| !c.is_alphanumeric())
                .any(|w| w == *k)
        }) {
            return Some(*lens);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_choice_maps_keywords() {
        assert_eq!(zone_choice("mostly work, I think"), Some(LensId::FinanceRhythm));
        assert_eq!(zone_choice("relationships"), Some(LensId::Boundary));
        assert_eq!(zone_choice("it's about how I feel"), Some(LensId::Narrative));
        assert_eq!(zone_choice("none of those"), None);
    }

    #[test]
    fn test_resume_plan_is_answer_first_without_fork() {
        let plan = resume_plan("deeper");
        assert!(plan.require_answer_first);
        assert!(plan.disable_fork);
        assert!(plan.explain_mode);
        assert!(plan.disable_closing_choice);
    }
}
