//! Topical line injection.
//!
//! Occasionally a generative reply gets one short tradition-flavored line
//! woven in after its first paragraph. Rate-limited by a turn cooldown and
//! keyed to the dominant lens so the line lands on topic.

use crate::domain::models::{LensId, SessionState, Thresholds};

/// Tradition voices a line can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Voice {
    StoicControl,
    Epicurean,
    Existential,
}

fn voice_for(lens: LensId) -> Voice {
    match lens {
        LensId::ControlScope | LensId::Boundary | LensId::RolePosition => Voice::StoicControl,
        LensId::FinanceRhythm | LensId::MicroAgency => Voice::Epicurean,
        LensId::Narrative | LensId::MortalityFocus | LensId::ExpectationGap | LensId::General => {
            Voice::Existential
        }
    }
}

fn line_for(voice: Voice) -> &'static str {
    match voice {
        Voice::StoicControl => {
            "The Stoics had a blunt sorting rule for moments like this: your \
             judgment and your next move are yours; the outcome mostly isn't."
        }
        Voice::Epicurean => {
            "Epicurus would ask the quieter question here: what is actually \
             enough, and how much of the pressure is chasing more than that?"
        }
        Voice::Existential => {
            "The existentialists would say this is less a verdict than a \
             choice point: the situation is given, the stance toward it isn't."
        }
    }
}

/// Injection permitted this turn? Cooldown-gated; never during warmup.
pub fn should_inject(state: &SessionState, thresholds: &Thresholds) -> bool {
    let since = i64::from(state.turn_index) - state.cooldowns.last_injection_turn;
    state.guidance_turns > 0 && since >= i64::from(thresholds.injection_cooldown_turns)
}

/// Insert a tradition line after the first paragraph. A single-paragraph
/// reply gets the line appended as its own paragraph.
pub fn insert_line(text: &str, lens: LensId) -> String {
    let line = line_for(voice_for(lens));
    if text.contains(line) {
        return text.to_string();
    }
    match text.find("\n\n") {
        Some(pos) => {
            let (head, tail) = text.split_at(pos);
            format!("{head}\n\n{line}{tail}")
        }
        None => format!("{text}\n\n{line}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{SessionState, Thresholds};

    #[test]
    fn test_cooldown_blocks_injection() {
        let mut state = SessionState::default();
        state.guidance_turns = 2;
        state.turn_index = 5;
        state.cooldowns.last_injection_turn = 3;
        assert!(!should_inject(&state, &Thresholds::default()));

        state.cooldowns.last_injection_turn = 1;
        assert!(should_inject(&state, &Thresholds::default()));
    }

    #[test]
    fn test_no_injection_during_warmup() {
        let state = SessionState::default();
        assert!(!should_inject(&state, &Thresholds::default()));
    }

    #[test]
    fn test_insert_after_first_paragraph() {
        let text = "First paragraph here.\n\nSecond paragraph here.";
        let out = insert_line(text, LensId::ControlScope);
        let parts: Vec<&str> = out.split("\n\n").collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[1].contains("Stoics"));
    }

    #[test]
    fn test_single_paragraph_gets_appended_line() {
        let out = insert_line("Only one paragraph.", LensId::Narrative);
        assert!(out.starts_with("Only one paragraph."));
        assert!(out.contains("existentialists"));
    }

    #[test]
    fn test_insertion_is_idempotent() {
        let once = insert_line("A reply.\n\nMore of it.", LensId::FinanceRhythm);
        let twice = insert_line(&once, LensId::FinanceRhythm);
        assert_eq!(once, twice);
    }
}
