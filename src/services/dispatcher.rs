//! Content dispatcher.
//!
//! Owns strategy selection for a turn: canned/templated, single-topic
//! guided path, or an augmented generative call. This is the only place in
//! the crate allowed to touch the `GenerationClient` port; any generation
//! failure degrades to a fixed apology line and never reaches the user as
//! an error.

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, warn};

use crate::domain::models::{LensId, SessionState, Stage, Strategy, Thresholds, TurnPlan};
use crate::domain::ports::{GenerationClient, GenerationRequest};
use crate::services::canned;
use crate::services::digest;
use crate::services::guided_path;
use crate::services::lenses::{self, LensCatalog};

const SYSTEM_PROMPT: &str =
    "You are a reflective conversation partner. You help one person think \
     through one situation using a small number of philosophical frames. \
     Plain language, second person, no jargon, no lecture. Stay with what \
     the person actually said.";

/// Everything the completion guard needs to ask for one regeneration.
#[derive(Debug, Clone)]
pub struct RegenContext {
    request: GenerationRequest,
}

/// Result of producing content for one turn.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub text: String,
    pub strategy: Strategy,
    pub lenses: Vec<LensId>,
    /// Present only on the generative path; consumed by the completion
    /// guard for its single allowed regeneration.
    pub regen: Option<RegenContext>,
    /// A templated bridge opened the reply; the controller records the
    /// turn mark for the bridge cooldown.
    pub used_bridge: bool,
    /// Lenses previewed by the guided path, awaiting a naming reply.
    pub previewed: Option<Vec<LensId>>,
}

impl DispatchOutcome {
    fn canned(text: String) -> Self {
        Self {
            text,
            strategy: Strategy::Canned,
            lenses: Vec::new(),
            regen: None,
            used_bridge: false,
            previewed: None,
        }
    }
}

/// Strategy selection and generative-call assembly. Reads state, never
/// mutates it; all state changes happen in the turn controller.
pub struct ContentDispatcher {
    generation: Arc<dyn GenerationClient>,
    catalog: LensCatalog,
    thresholds: Thresholds,
}

impl ContentDispatcher {
    pub fn new(generation: Arc<dyn GenerationClient>, thresholds: Thresholds) -> Self {
        Self {
            generation,
            catalog: LensCatalog,
            thresholds,
        }
    }

    /// Produce the reply text for a turn. Exactly one strategy runs.
    pub async fn dispatch(
        &self,
        plan: &TurnPlan,
        utterance: &str,
        state: &SessionState,
    ) -> DispatchOutcome {
        if let Some(reply) = &plan.canned_reply {
            return DispatchOutcome::canned(reply.clone());
        }

        if plan.force_repeat_options {
            let options = state.last_offered_options.clone().unwrap_or_default();
            return DispatchOutcome::canned(canned::repeat_options_line(&options));
        }

        if plan.force_guided_path {
            let (text, offered) = guided_path::render_preview(utterance);
            return DispatchOutcome {
                text,
                strategy: Strategy::GuidedPath,
                lenses: offered.clone(),
                regen: None,
                used_bridge: false,
                previewed: Some(offered),
            };
        }

        self.generate(plan, utterance, state).await
    }

    /// One completion-guard regeneration with an explicit completion
    /// directive. Failure degrades to the apology line, same as the first
    /// call.
    pub async fn regenerate(&self, ctx: &RegenContext) -> String {
        let mut request = ctx.request.clone();
        request.instructions.push_str(
            "\n\nYour previous attempt trailed off. Answer again and finish \
             the thought completely, ending on a full sentence.",
        );
        match self.generation.generate(request).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => canned::APOLOGY_FALLBACK.to_string(),
            Err(error) => {
                warn!(%error, "regeneration failed, substituting fallback");
                canned::APOLOGY_FALLBACK.to_string()
            }
        }
    }

    async fn generate(
        &self,
        plan: &TurnPlan,
        utterance: &str,
        state: &SessionState,
    ) -> DispatchOutcome {
        let selected = self.select_lenses(plan, utterance, state);
        let instructions = self.build_instructions(plan, state, &selected);
        let request = GenerationRequest::new(instructions, utterance)
            .with_digest(digest::build_digest(state));

        let mut text = match self.generation.generate(request.clone()).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("generation returned empty text, substituting fallback");
                return DispatchOutcome::canned(canned::APOLOGY_FALLBACK.to_string());
            }
            Err(error) => {
                warn!(%error, "generation failed, substituting fallback");
                return DispatchOutcome::canned(canned::APOLOGY_FALLBACK.to_string());
            }
        };

        // Anti-lecture: one shorter retry, never more. A failed retry keeps
        // the long text rather than degrading a usable reply.
        if self.is_lecturing(&text) && !plan.disable_short_retry {
            debug!(chars = text.chars().count(), "reply judged lecturing, retrying short");
            match self.generation.generate(request.clone().forced_short()).await {
                Ok(shorter) if !shorter.trim().is_empty() => text = shorter,
                Ok(_) | Err(_) => {}
            }
        }

        let mut used_bridge = false;
        if plan.add_bridge && !plan.disable_templated_opening {
            let mut rng = rand::thread_rng();
            // Half the eligible turns open plainly even when allowed.
            if rng.gen_bool(0.5) {
                text = format!("{} {text}", canned::pick_bridge(&mut rng));
                used_bridge = true;
            }
        }

        DispatchOutcome {
            text,
            strategy: Strategy::Generative,
            lenses: selected,
            regen: Some(RegenContext { request }),
            used_bridge,
            previewed: None,
        }
    }

    fn select_lenses(
        &self,
        plan: &TurnPlan,
        utterance: &str,
        state: &SessionState,
    ) -> Vec<LensId> {
        if let Some(locked) = state.active_lens() {
            return vec![locked];
        }
        lenses::select_lenses(utterance, plan.max_lenses)
    }

    fn build_instructions(
        &self,
        plan: &TurnPlan,
        state: &SessionState,
        selected: &[LensId],
    ) -> String {
        let mut parts = vec![SYSTEM_PROMPT.to_string()];

        let stage = plan.stage_override.unwrap_or(state.stage);
        parts.push(match stage {
            Stage::Guidance => {
                "The conversation is in its working phase: engage the \
                 situation directly and in depth."
                    .to_string()
            }
            _ => "The conversation is still settling in: stay light, reflect \
                  before you frame."
                .to_string(),
        });

        if plan.require_answer_first {
            parts.push(
                "Answer the actual question in your first sentence, before \
                 any framing or reflection."
                    .to_string(),
            );
        }
        if plan.explain_mode {
            parts.push(
                "Go deeper on the previous point rather than introducing a \
                 new angle. Unpack, illustrate, make it concrete."
                    .to_string(),
            );
        }
        if plan.depth_mode {
            parts.push(
                "Bring the philosophical frames into the open: name the \
                 perspective you are using and what it changes."
                    .to_string(),
            );
        }
        if state.force_expand_next {
            parts.push(
                "Your previous reply was too thin. Give this one real room: \
                 several full paragraphs."
                    .to_string(),
            );
        }
        if plan.allow_topic_examples {
            parts.push(
                "Offer one brief comparative example from a second tradition \
                 so the contrast is visible."
                    .to_string(),
            );
        }
        parts.push(format!(
            "Ask at most {} question{}.",
            plan.max_questions,
            if plan.max_questions == 1 { "" } else { "s" }
        ));

        parts.push(format!("Working frames:\n{}", self.catalog.bundle(selected)));

        parts.join("\n\n")
    }

    fn is_lecturing(&self, text: &str) -> bool {
        text.chars().count() > self.thresholds.lecture_max_chars
            || text.lines().count() > self.thresholds.lecture_max_lines
    }
}
