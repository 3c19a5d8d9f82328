//! Intent classifiers.
//!
//! Pure functions over the current utterance (plus a few cheap state
//! fields). `classify_all` gathers every signal into one `IntentSignals`
//! value; the plan governor owns conflict resolution between them.

pub mod capability;
pub mod gates;
pub mod safety;
pub mod topics;

use crate::domain::models::{IntentSignals, SessionState, Thresholds};

/// Run every classifier over the utterance. Order inside this function
/// does not matter: signals are independent; precedence lives in the
/// governor.
pub fn classify_all(text: &str, state: &SessionState, thresholds: &Thresholds) -> IntentSignals {
    let mut signals = IntentSignals {
        safety_risk: safety::is_safety_risk(text),
        capability: capability::detect_capability(text, thresholds.capability_min_score),
        philosophy_intent: topics::is_philosophy_intent(text),
        direct_philosophy: topics::is_direct_philosophy(text),
        tradition_switch: topics::is_tradition_switch(text),
        structure_demand: gates::is_structure_demand(text),
        sensitive_topic: topics::is_sensitive_topic(text) || topics::is_religious_topic(text),
        pragmatic_irritation: gates::is_pragmatic(text),
        irritation_at_brevity: gates::is_irritated_at_brevity(text),
        expand_request: gates::is_expand_request(text),
        substantive: topics::is_substantive(text, thresholds),
        ambiguous: gates::is_ambiguous(text, thresholds.ambiguous_max_chars),
        acknowledgment: gates::is_acknowledgment(text),
        short_ack: gates::is_short_ack(text),
        short_ambiguous: gates::is_short_ambiguous(text),
        financial_pattern: topics::is_financial_pattern(text),
        stable_pattern: topics::is_stable_pattern(text),
        term_question: gates::term_question(text),
        confusion: gates::is_confusion(text),
        guidance_trigger: gates::is_guidance_trigger(text),
    };

    // A short ambiguous reply only means "re-present the options" when
    // options were actually offered and are still live.
    if signals.short_ambiguous
        && !state.followthrough_pending(thresholds.followthrough_expiry_turns)
    {
        signals.short_ambiguous = false;
    }

    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{SessionState, Thresholds};

    #[test]
    fn test_safety_dominates_signal_set() {
        let state = SessionState::default();
        let signals = classify_all(
            "I don't want to live anymore",
            &state,
            &Thresholds::default(),
        );
        assert!(signals.safety_risk);
    }

    #[test]
    fn test_short_ambiguous_requires_live_followthrough() {
        let state = SessionState::default();
        let signals = classify_all("both", &state, &Thresholds::default());
        assert!(!signals.short_ambiguous);
        assert!(signals.short_ack);
    }

    #[test]
    fn test_substantive_question_sets_multiple_signals() {
        let state = SessionState::default();
        let signals = classify_all(
            "Why does it make sense to keep working when the money disappears again?",
            &state,
            &Thresholds::default(),
        );
        assert!(signals.substantive);
        assert!(signals.financial_pattern);
        assert!(signals.stable_pattern);
        assert!(!signals.ambiguous);
    }
}
