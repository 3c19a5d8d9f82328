//! Fixed reply texts and template pools.
//!
//! Wording here is deliberately not a contract; the structural promises
//! (what gets offered, what never asks a question) are.

use rand::seq::SliceRandom;

use crate::domain::models::Term;

/// Warmup bridge openings. One is chosen at random when the plan allows a
/// templated opening and the bridge cooldown permits.
pub const WARMUP_BRIDGES: &[&str] = &[
    "Let me make sure I'm hearing this right.",
    "Before any frameworks — let's just look at what's actually going on.",
    "Okay, staying with what you said for a moment.",
    "Let's slow this down a little.",
];

/// Coarse orientation question offered once on vague input.
pub const ORIENTATION_PROMPT: &str =
    "I can work with that, but let me get a rough bearing first. Is this \
     sitting closest to work and money, to people and relationships, or to \
     how you feel about yourself?";

/// Substituted whenever the generation collaborator fails outright.
pub const APOLOGY_FALLBACK: &str =
    "I lost my thread there — not your fault. Say it once more, or just \
     continue from where you were, and I'll pick it up.";

/// Returned for empty/whitespace input.
pub const EMPTY_INPUT_PROMPT: &str =
    "I got an empty message. Whenever you're ready, a sentence or two is \
     plenty to start from.";

/// Example-first term definitions. Definition arrives after the example,
/// never before.
pub fn term_reply(term: Term) -> String {
    match term {
        Term::Frame => {
            "Say a client disappears mid-project. You can read that as \"I \
             failed\" or as \"the project ended early\" — same facts, very \
             different weight. That reading is a frame: the angle a situation \
             is held at. We can try a different frame on anything you bring."
        }
        Term::Lens => {
            "When money arrives in waves, looking at one dry month in \
             isolation feels like failure; looking at the whole wave makes it \
             a phase. That wider view is a lens: one specific aspect pulled \
             into focus. I pick a couple of lenses per topic and you can \
             always ask for another."
        }
        Term::Optic => {
            "Think of asking the same question to a Stoic and to Epicurus — \
             one sorts it by what you control, the other by what is enough. \
             An optic is a whole tradition used as a viewing instrument. You \
             can ask to switch optics at any point."
        }
    }
    .to_string()
}

/// Re-present previously offered options after a "both"/"yes" style reply.
pub fn repeat_options_line(options: &[String]) -> String {
    if options.is_empty() {
        return "One at a time works better here. Which part do you want to start with?"
            .to_string();
    }
    format!(
        "One at a time works better here. Shall we start with {}?",
        options.join(" — or ")
    )
}

/// Pick a warmup bridge. Randomness lives here, not in planning.
pub fn pick_bridge<R: rand::Rng + ?Sized>(rng: &mut R) -> &'static str {
    WARMUP_BRIDGES
        .choose(rng)
        .copied()
        .unwrap_or(WARMUP_BRIDGES[0])
}
