//! Completion guard.
//!
//! A reply must read as finished: long enough for its stage, ending on
//! terminal punctuation, not trailing off into a dangling fragment. Repair
//! is cheap (append a neutral closing line); anything repair can't fix is
//! flagged for the controller's single regeneration, and a retry that
//! still dangles is sealed on a sentence boundary instead of shipping
//! mid-sentence.

use rand::seq::SliceRandom;

use crate::domain::models::Stage;
use crate::services::shaping::ShapeContext;

/// Neutral closings. None of them asks a question.
const CLOSING_POOL: &[&str] = &[
    "We can stay on this thread as long as it's useful.",
    "No rush on any of this; it keeps until you're ready.",
    "That's the core of it as I see it from here.",
    "Take whichever part of that actually lands and leave the rest.",
];

/// Result of the completion stage.
pub struct CompletionOutcome {
    pub text: String,
    pub needs_regeneration: bool,
}

fn ends_terminal(text: &str) -> bool {
    matches!(
        text.trim_end().chars().last(),
        Some('.' | '!' | '?' | '…' | '"' | ')' | ':')
    )
}

fn dangling_last_line(text: &str) -> bool {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    match lines.last() {
        Some(last) if lines.len() > 1 => last.trim().chars().count() < 18,
        _ => false,
    }
}

// A closing may sit before an injected choice line, so scan the whole
// text rather than only the tail.
fn has_pool_closing(text: &str) -> bool {
    CLOSING_POOL.iter().any(|c| text.contains(c))
}

/// Byte offset just past the last sentence terminator that is followed by
/// whitespace. `None` when the text has no finished sentence.
fn last_sentence_end(text: &str) -> Option<usize> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut end = None;
    for (i, &(offset, ch)) in chars.iter().enumerate() {
        if !matches!(ch, '.' | '!' | '?' | '…') {
            continue;
        }
        if chars.get(i + 1).is_some_and(|&(_, next)| next.is_whitespace()) {
            end = Some(offset + ch.len_utf8());
        }
    }
    end
}

/// Seal text that is still incomplete after its one regeneration. A
/// dangling tail is cut back to the last finished sentence when one
/// exists, otherwise closed with an ellipsis, and a pool closing lands
/// the reply on terminal punctuation.
pub fn force_terminal(text: &str) -> String {
    let mut base = text.trim().to_string();
    if base.is_empty() {
        return CLOSING_POOL[0].to_string();
    }
    if !ends_terminal(&base) {
        match last_sentence_end(&base) {
            Some(cut) => {
                base.truncate(cut);
                base.truncate(base.trim_end().len());
            }
            None => base.push('…'),
        }
    }
    if has_pool_closing(&base) {
        return base;
    }
    let mut rng = rand::thread_rng();
    let closing = CLOSING_POOL
        .choose(&mut rng)
        .copied()
        .unwrap_or(CLOSING_POOL[0]);
    format!("{base}\n\n{closing}")
}

fn stage_min(ctx: &ShapeContext<'_>) -> usize {
    match ctx.stage {
        Stage::Guidance => ctx.thresholds.guidance_min_reply_chars,
        _ => ctx.thresholds.warmup_min_reply_chars,
    }
}

/// Check and repair completeness.
pub fn guard(text: &str, ctx: &ShapeContext<'_>) -> CompletionOutcome {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return CompletionOutcome {
            text: text.to_string(),
            needs_regeneration: true,
        };
    }

    // A mid-sentence dangle can't be papered over with a closing line.
    if !ends_terminal(trimmed) {
        return CompletionOutcome {
            text: text.to_string(),
            needs_regeneration: true,
        };
    }

    let min = stage_min(ctx);
    let short = trimmed.chars().count() < min;
    if !short && !dangling_last_line(trimmed) {
        return CompletionOutcome {
            text: text.to_string(),
            needs_regeneration: false,
        };
    }

    // Repair once; an already-repaired reply that is still short goes to
    // regeneration instead of accreting closings.
    if has_pool_closing(trimmed) {
        return CompletionOutcome {
            text: text.to_string(),
            needs_regeneration: short,
        };
    }

    let mut rng = rand::thread_rng();
    let closing = CLOSING_POOL
        .choose(&mut rng)
        .copied()
        .unwrap_or(CLOSING_POOL[0]);
    let repaired = format!("{trimmed}\n\n{closing}");
    let still_short = repaired.chars().count() < min;

    CompletionOutcome {
        text: repaired,
        needs_regeneration: still_short,
    }
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
            allow_choice_injection: false,
        }
    }

    #[test]
    fn test_complete_reply_untouched() {
        let plan = TurnPlan::for_rule("residual");
        let state = SessionState::default();
        let thresholds = Thresholds::default();
        let ctx = ctx_with(&plan, &state, &thresholds, Stage::Warmup);

        let text = "This reply is complete, long enough for warmup, and ends properly.";
        let outcome = guard(text, &ctx);
        assert_eq!(outcome.text, text);
        assert!(!outcome.needs_regeneration);
    }

    #[test]
    fn test_dangling_fragment_flags_regeneration() {
        let plan = TurnPlan::for_rule("residual");
        let state = SessionState::default();
        let thresholds = Thresholds::default();
        let ctx = ctx_with(&plan, &state, &thresholds, Stage::Warmup);

        let outcome = guard("The thing about control is that it only", &ctx);
        assert!(outcome.needs_regeneration);
    }

    #[test]
    fn test_short_guidance_reply_gets_closing_then_regen() {
        let plan = TurnPlan::for_rule("residual");
        let state = SessionState::default();
        let thresholds = Thresholds::default();
        let ctx = ctx_with(&plan, &state, &thresholds, Stage::Guidance);

        let outcome = guard("Too thin for guidance.", &ctx);
        assert!(outcome.text.len() > "Too thin for guidance.".len());
        assert!(outcome.needs_regeneration);
    }

    #[test]
    fn test_repair_does_not_accrete() {
        let plan = TurnPlan::for_rule("residual");
        let state = SessionState::default();
        let thresholds = Thresholds::default();
        let ctx = ctx_with(&plan, &state, &thresholds, Stage::Guidance);

        let once = guard("Too thin for guidance.", &ctx);
        let twice = guard(&once.text, &ctx);
        assert_eq!(once.text, twice.text);
    }

    #[test]
    fn test_closing_before_choice_line_still_counts_as_repaired() {
        let plan = TurnPlan::for_rule("residual");
        let state = SessionState::default();
        let thresholds = Thresholds::default();
        let ctx = ctx_with(&plan, &state, &thresholds, Stage::Guidance);

        let text = format!(
            "Too thin for guidance.\n\n{}\n\nIf you want, we can go deeper or keep it practical.",
            CLOSING_POOL[1]
        );
        let outcome = guard(&text, &ctx);
        assert_eq!(outcome.text, text);
        let occurrences = outcome.text.matches(CLOSING_POOL[1]).count();
        assert_eq!(occurrences, 1);
    }

    #[test]
    fn test_force_terminal_seals_bare_fragment() {
        let out = force_terminal("the real answer is that it depends on");
        let last = out.trim_end().chars().last().unwrap();
        assert!(matches!(last, '.' | '!' | '?' | '…'));
        assert!(CLOSING_POOL.iter().any(|c| out.contains(c)));
    }

    #[test]
    fn test_force_terminal_cuts_dangling_tail() {
        let out = force_terminal("The first sentence stands on its own. And then it trails into");
        assert!(!out.contains("trails into"));
        assert!(out.starts_with("The first sentence stands on its own."));
        let last = out.trim_end().chars().last().unwrap();
        assert!(matches!(last, '.' | '!' | '?' | '…'));
    }

    #[test]
    fn test_force_terminal_leaves_repaired_text_alone() {
        let text = format!("Too thin for guidance.\n\n{}", CLOSING_POOL[2]);
        assert_eq!(force_terminal(&text), text);
    }

    #[test]
    fn test_empty_input_flags_regeneration() {
        let plan = TurnPlan::for_rule("residual");
        let state = SessionState::default();
        let thresholds = Thresholds::default();
        let ctx = ctx_with(&plan, &state, &thresholds, Stage::Warmup);

        let outcome = guard("   ", &ctx);
        assert!(outcome.needs_regeneration);
    }
}
