//! Response shaping pipeline.
//!
//! A fixed, ordered sequence of idempotent text transforms applied to every
//! reply before it leaves the system, regardless of which strategy produced
//! it. Running the pipeline twice yields the same text as running it once;
//! a transform chain that ends in an empty string falls back to the
//! pre-transform text.

pub mod closing;
pub mod completion;
pub mod meta;
pub mod practice;
pub mod questions;
pub mod style;

use tracing::trace;

use crate::domain::models::{SessionState, Stage, Thresholds, TurnPlan};

/// Read-only inputs to one shaping run.
pub struct ShapeContext<'a> {
    pub plan: &'a TurnPlan,
    pub state: &'a SessionState,
    pub thresholds: &'a Thresholds,
    /// Effective stage for this turn (plan override already applied).
    pub stage: Stage,
    /// A closing choice may be injected this run. The controller clears
    /// this on the post-regeneration rerun so the pipeline stays
    /// idempotent across the retry.
    pub allow_choice_injection: bool,
}

/// Output of one shaping run.
#[derive(Debug, Clone, Default)]
pub struct Shaped {
    pub text: String,
    /// Completion guard verdict: text still dangling after repair. The
    /// controller performs at most one regeneration per turn.
    pub needs_regeneration: bool,
    /// A forced-choice closing was injected; the controller stores it as
    /// the pending follow-through.
    pub injected_choice: Option<InjectedChoice>,
    /// The final text prescribes an actionable exercise; the controller
    /// arms the practice cooldown.
    pub contains_practice: bool,
    /// A book/author recommendation was detected and the turn was closed
    /// softly; the controller arms a recommendation pause.
    pub recommendation_pause: bool,
}

/// Forced-choice closing data for the session's pending follow-through.
#[derive(Debug, Clone)]
pub struct InjectedChoice {
    pub prompt: String,
    pub options: Vec<String>,
    pub default: String,
}

/// Split text into sentences on terminal punctuation. Keeps the terminator
/// with its sentence; treats `…` as terminal.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?' | '…') {
            // Consume closing quotes/parens attached to the sentence.
            while let Some(&next) = chars.peek() {
                if matches!(next, '"' | '\'' | ')' | '»') {
                    current.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            // A terminator followed by whitespace (or end) closes the
            // sentence; "3.5" or "e.g." style interiors do not.
            match chars.peek() {
                Some(&next) if next.is_whitespace() => {
                    sentences.push(current.trim().to_string());
                    current.clear();
                }
                None => {}
                _ => {}
            }
        }
    }
    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

/// Apply a sentence-level transform line by line, preserving blank-line
/// paragraph structure and enumeration lines. Lines that transform to
/// nothing are dropped, and so are paragraphs left empty.
pub fn map_paragraphs<F: FnMut(&str) -> String>(text: &str, mut f: F) -> String {
    text.split("\n\n")
        .map(|p| {
            p.lines()
                .map(|line| f(line))
                .filter(|line| !line.trim().is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The pipeline itself. Stateless; safe to share.
#[derive(Debug, Clone, Default)]
pub struct Pipeline;

impl Pipeline {
    /// Run every stage in order. Never errors.
    pub fn run(&self, input: &str, ctx: &ShapeContext<'_>) -> Shaped {
        let original = input.to_string();
        let mut shaped = Shaped::default();
        let mut text = input.trim().to_string();

        text = meta::strip_meta_tail(&text);
        trace!(stage = "meta", chars = text.chars().count());

        let practice = practice::apply(&text, ctx);
        text = practice.text;
        shaped.contains_practice = practice.contains_practice;
        shaped.recommendation_pause = practice.recommendation_pause;
        trace!(stage = "practice", chars = text.chars().count());

        text = style::apply(&text, ctx);
        trace!(stage = "style", chars = text.chars().count());

        let max_questions = if shaped.recommendation_pause {
            0
        } else {
            ctx.plan.max_questions
        };
        text = questions::clamp(&text, max_questions);
        trace!(stage = "questions", chars = text.chars().count());

        let completion = completion::guard(&text, ctx);
        text = completion.text;
        shaped.needs_regeneration = completion.needs_regeneration;
        trace!(stage = "completion", incomplete = shaped.needs_regeneration);

        if ctx.allow_choice_injection && !shaped.recommendation_pause {
            if let Some((with_choice, choice)) = closing::inject(&text, ctx, max_questions) {
                text = with_choice;
                shaped.injected_choice = Some(choice);
            }
        }
        trace!(stage = "closing", injected = shaped.injected_choice.is_some());

        text = meta::final_strip(&text);
        text = style::normalize_whitespace(&text);

        if text.chars().count() > ctx.thresholds.max_reply_chars {
            text = truncate_on_sentence(&text, ctx.thresholds.max_reply_chars);
        }

        // Dead-end guard: a transform chain must never eat the reply.
        if text.trim().is_empty() {
            text = original;
        }
        shaped.text = text;
        shaped
    }
}

fn truncate_on_sentence(text: &str, max_chars: usize) -> String {
    let mut out = String::new();
    for sentence in split_sentences(text) {
        if out.chars().count() + sentence.chars().count() + 1 > max_chars {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&sentence);
    }
    if out.is_empty() {
        text.chars().take(max_chars).collect()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{SessionState, Thresholds, TurnPlan};

    fn ctx<'a>(
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

    #[test]
    fn test_split_sentences_basic() {
        let sentences = split_sentences("One here. Two there! Three maybe? Four");
        assert_eq!(sentences.len(), 4);
        assert_eq!(sentences[0], "One here.");
        assert_eq!(sentences[2], "Three maybe?");
        assert_eq!(sentences[3], "Four");
    }

    #[test]
    fn test_split_sentences_keeps_interior_dots() {
        let sentences = split_sentences("The rate was 3.5 percent. That is all.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0], "The rate was 3.5 percent.");
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let plan = TurnPlan::for_rule("residual");
        let state = SessionState::default();
        let thresholds = Thresholds::default();
        let ctx = ctx(&plan, &state, &thresholds);
        let pipeline = Pipeline;

        let input = "You asked about control. Here is one way to hold it: the \
                     outcome was never fully yours, only the preparation was. \
                     That distinction sounds small but it redraws the whole \
                     situation once you apply it honestly. What part of the \
                     preparation felt most yours? I can stay on that thread.";
        let once = pipeline.run(input, &ctx);
        let twice = pipeline.run(&once.text, &ctx);
        assert_eq!(once.text, twice.text);
    }

    #[test]
    fn test_bulleted_reply_keeps_its_lines() {
        let plan = TurnPlan::for_rule("residual");
        let state = SessionState::default();
        let thresholds = Thresholds::default();
        let ctx = ctx(&plan, &state, &thresholds);

        let input = "Start with the smallest ledger you can stand to keep.\n\
                     - Put down the number you actually owe, not the number you fear.\n\
                     - Note which bills move and which are fixed.\n\
                     - Mark the single payment that buys the most calm.\n\
                     None of this settles the debt, but it turns a fog into a \
                     list, and a list is something a person can work on in \
                     daylight without flinching at it.";
        let shaped = Pipeline.run(input, &ctx);
        assert!(!shaped.needs_regeneration);
        assert!(shaped.text.contains("\n- Note which bills move and which are fixed."));
        assert!(shaped.text.contains("\n- Mark the single payment that buys the most calm."));
    }

    #[test]
    fn test_dead_end_falls_back_to_input() {
        let plan = TurnPlan::for_rule("residual");
        let state = SessionState::default();
        let thresholds = Thresholds::default();
        let ctx = ctx(&plan, &state, &thresholds);

        // Pure meta-commentary would be stripped to nothing.
        let input = "Would you like me to continue in this format?";
        let shaped = Pipeline.run(input, &ctx);
        assert!(!shaped.text.trim().is_empty());
    }

    #[test]
    fn test_hard_cap_truncates_on_sentence_boundary() {
        let plan = TurnPlan::for_rule("residual");
        let state = SessionState::default();
        let mut thresholds = Thresholds::default();
        thresholds.max_reply_chars = 120;
        thresholds.guidance_min_reply_chars = 10;
        let ctx = ctx(&plan, &state, &thresholds);

        let input = "This is the first full sentence of the reply. This is the \
                     second full sentence of the reply. This is the third full \
                     sentence of the reply, well past the cap.";
        let shaped = Pipeline.run(input, &ctx);
        assert!(shaped.text.chars().count() <= 120);
        assert!(shaped.text.ends_with('.'));
    }
}
