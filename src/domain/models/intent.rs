//! Classifier result types.
//!
//! Classifiers are pure predicates/scorers over the current utterance (and
//! occasionally lightweight state fields). Their outputs are gathered into
//! one `IntentSignals` value per turn and handed to the plan governor, which
//! owns conflict resolution.

/// Scored capability/meta-question detection ("what can you do").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilityIntent {
    pub matched: bool,
    pub score: i32,
}

/// Term the user is asking to have defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    Frame,
    Lens,
    Optic,
}

impl Term {
    pub fn as_str(&self) -> &'static str {
        match self {
            Term::Frame => "frame",
            Term::Lens => "lens",
            Term::Optic => "optic",
        }
    }
}

/// All classifier outputs for one turn. Transient; recomputing it is safe
/// and side-effect free.
#[derive(Debug, Clone, Default)]
pub struct IntentSignals {
    /// Crisis/risk content. Highest priority; short-circuits everything.
    pub safety_risk: bool,
    pub capability: CapabilityIntent,
    /// Explicit decision/value/meaning intent: skip small talk.
    pub philosophy_intent: bool,
    /// Direct "unpack this through tradition X" style ask.
    pub direct_philosophy: bool,
    /// "answer through buddhism instead": active redirection.
    pub tradition_switch: bool,
    /// "just give me steps, no filler".
    pub structure_demand: bool,
    /// Religious/worldview markers needing a dedicated framing.
    pub sensitive_topic: bool,
    /// "stop being vague" / irritation at templated replies.
    pub pragmatic_irritation: bool,
    /// Irritation specifically at short, formulaic replies.
    pub irritation_at_brevity: bool,
    /// Wants more depth on the prior turn, not a new topic.
    pub expand_request: bool,
    /// Long or structurally rich utterance: answer first.
    pub substantive: bool,
    /// Vague/low-signal input; never set when a topic keyword or an
    /// acknowledgment phrase is present.
    pub ambiguous: bool,
    /// Closing acknowledgment ("understood, thanks").
    pub acknowledgment: bool,
    /// Short acknowledgment usable to resume a pending follow-through.
    pub short_ack: bool,
    /// Short ambiguous reply ("both", "yes") after offered options.
    pub short_ambiguous: bool,
    pub financial_pattern: bool,
    /// Recurring life/financial rhythm ("feast or famine, over and over").
    pub stable_pattern: bool,
    pub term_question: Option<Term>,
    /// "I don't understand": answer with an example, not clarifiers.
    pub confusion: bool,
    /// "what should I do" style ask: jump to guidance stage.
    pub guidance_trigger: bool,
}
