//! Safety/risk classifier.
//!
//! Highest-priority check: when it fires, all other classification is
//! skipped and the fixed safe-response path is taken. The safety branch is
//! per-turn only: it never persists as the stored stage.

const SAFETY_MARKERS: &[&str] = &[
    "kill myself",
    "end my life",
    "end it all",
    "suicide",
    "self-harm",
    "self harm",
    "hurt myself",
    "harm myself",
    "don't want to live",
    "do not want to live",
    "no reason to live",
    "better off dead",
    "want to disappear forever",
];

/// Crisis-content scan over the raw utterance.
pub fn is_safety_risk(text: &str) -> bool {
    let t = text.to_lowercase();
    SAFETY_MARKERS.iter().any(|m| t.contains(m))
}

/// Fixed safe response. Deliberately plain: acknowledgment, a handoff to
/// real help, no questions, no frames.
pub fn safe_response() -> String {
    "It sounds like you are carrying something very heavy right now, and I \
     want to be honest: this is beyond what a reflection tool should hold \
     alone. Please reach out to someone who can actually be there — a person \
     you trust, a doctor, or a local crisis line. If you are in immediate \
     danger, contact your local emergency number. I'll still be here \
     afterwards if you want to think things through together."
        .to_string()
}
