//! Per-conversation session state.
//!
//! One `SessionState` exists per conversation identity. It is owned by the
//! `SessionStore` and mutated only while that conversation's per-key lock is
//! held. Every field carries a serde default so partially persisted blobs
//! from older versions hydrate cleanly.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse conversational phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Warmup,
    Guidance,
    /// Per-turn branch only. The safety path answers and returns without
    /// being written back as the stored stage.
    Safety,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Warmup => "warmup",
            Stage::Guidance => "guidance",
            Stage::Safety => "safety",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supporting topical frame ("lens") attached to generative calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LensId {
    ControlScope,
    MicroAgency,
    Boundary,
    ExpectationGap,
    FinanceRhythm,
    RolePosition,
    Narrative,
    MortalityFocus,
    General,
}

impl LensId {
    pub fn as_str(&self) -> &'static str {
        match self {
            LensId::ControlScope => "control_scope",
            LensId::MicroAgency => "micro_agency",
            LensId::Boundary => "boundary",
            LensId::ExpectationGap => "expectation_gap",
            LensId::FinanceRhythm => "finance_rhythm",
            LensId::RolePosition => "role_position",
            LensId::Narrative => "narrative",
            LensId::MortalityFocus => "mortality_focus",
            LensId::General => "general",
        }
    }
}

/// Who produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Agent,
}

/// One entry in the short per-conversation history buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

/// Kind of outstanding implicit choice the agent offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowThroughKind {
    /// "continue with (1) or (2)?": resolvable by a short acknowledgment.
    ForcedChoice,
    /// A concrete micro-step was offered.
    OfferedAction,
    /// An open question the user can accept with "yes"/"ok".
    OpenQuestion,
}

/// An outstanding implicit choice, resolvable by a short acknowledgment on a
/// later turn. Expires after a fixed number of turns if unresolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingFollowThrough {
    pub kind: FollowThroughKind,
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub default: Option<String>,
    pub created_turn: u32,
}

/// Temporary restriction to a single topical frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicLock {
    pub lens: LensId,
    pub turns_remaining: u32,
}

/// Named pacing counters. `practice_turns` ticks down once per guidance
/// turn and never goes negative; the `last_*` fields are turn marks
/// compared against the current turn index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cooldowns {
    #[serde(default)]
    pub practice_turns: u32,
    #[serde(default = "default_turn_mark")]
    pub last_injection_turn: i64,
    #[serde(default = "default_turn_mark")]
    pub last_bridge_turn: i64,
    #[serde(default = "default_turn_mark")]
    pub last_fork_turn: i64,
    #[serde(default = "default_turn_mark")]
    pub last_suggest_turn: i64,
}

fn default_turn_mark() -> i64 {
    -10
}

impl Default for Cooldowns {
    fn default() -> Self {
        Self {
            practice_turns: 0,
            last_injection_turn: -10,
            last_bridge_turn: -10,
            last_fork_turn: -10,
            last_suggest_turn: -10,
        }
    }
}

/// Accumulated topical interest signals, used for the occasional
/// "this optic may resonate with you" suggestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterestProfile {
    #[serde(default)]
    pub turns: u32,
    #[serde(default)]
    pub lens_counts: std::collections::HashMap<String, u32>,
}

impl InterestProfile {
    pub fn record(&mut self, lenses: &[LensId]) {
        self.turns += 1;
        for lens in lenses {
            *self.lens_counts.entry(lens.as_str().to_string()).or_insert(0) += 1;
        }
    }

    /// Best-scoring lens and its share of recorded signals.
    pub fn dominant(&self) -> Option<(String, f64)> {
        let total: u32 = self.lens_counts.values().sum();
        if total == 0 {
            return None;
        }
        self.lens_counts
            .iter()
            .max_by_key(|(name, count)| (**count, std::cmp::Reverse(name.as_str())))
            .map(|(name, count)| (name.clone(), f64::from(*count) / f64::from(total)))
    }
}

/// Per-conversation state. Created on first contact with stage `Warmup`
/// and zeroed counters; updated once per processed turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub stage: Stage,
    #[serde(default)]
    pub turn_index: u32,
    #[serde(default)]
    pub message_count: u32,
    #[serde(default)]
    pub guidance_turns: u32,
    #[serde(default)]
    pub history: VecDeque<HistoryEntry>,
    #[serde(default)]
    pub active_topic_lock: Option<TopicLock>,
    #[serde(default)]
    pub pending_followthrough: Option<PendingFollowThrough>,
    #[serde(default)]
    pub cooldowns: Cooldowns,
    #[serde(default)]
    pub last_user_text: String,
    #[serde(default)]
    pub last_agent_text: String,
    #[serde(default)]
    pub last_offered_options: Option<Vec<String>>,
    /// Orientation offer shown last turn; the next reply is read as a
    /// zone choice.
    #[serde(default)]
    pub pending_orientation: bool,
    /// One-turn suppression of forks and templated patterns right after
    /// an orientation choice.
    #[serde(default)]
    pub orientation_hold: bool,
    /// Turn on which a lens preview was shown; a naming reply on the
    /// following turn locks the chosen lens.
    #[serde(default)]
    pub last_preview_turn: Option<u32>,
    /// The previous guidance reply came out short; the next generative
    /// call gets an expansion directive.
    #[serde(default)]
    pub force_expand_next: bool,
    #[serde(default)]
    pub interest: InterestProfile,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            stage: Stage::Warmup,
            turn_index: 0,
            message_count: 0,
            guidance_turns: 0,
            history: VecDeque::new(),
            active_topic_lock: None,
            pending_followthrough: None,
            cooldowns: Cooldowns::default(),
            last_user_text: String::new(),
            last_agent_text: String::new(),
            last_offered_options: None,
            pending_orientation: false,
            orientation_hold: false,
            last_preview_turn: None,
            force_expand_next: false,
            interest: InterestProfile::default(),
            last_updated: None,
        }
    }

    /// Currently locked lens, if the lock is still active.
    pub fn active_lens(&self) -> Option<LensId> {
        self.active_topic_lock
            .as_ref()
            .filter(|lock| lock.turns_remaining > 0)
            .map(|lock| lock.lens)
    }

    /// Lock a single lens for the next `turns` guidance turns.
    pub fn lock_topic(&mut self, lens: LensId, turns: u32) {
        self.active_topic_lock = Some(TopicLock {
            lens,
            turns_remaining: turns,
        });
    }

    /// Count the topic lock down one turn, clearing it when it reaches zero.
    pub fn tick_topic_lock(&mut self) {
        if let Some(lock) = self.active_topic_lock.as_mut() {
            lock.turns_remaining = lock.turns_remaining.saturating_sub(1);
            if lock.turns_remaining == 0 {
                self.active_topic_lock = None;
            }
        }
    }

    /// Count the practice cooldown down one turn. Never goes negative.
    pub fn tick_practice_cooldown(&mut self) {
        self.cooldowns.practice_turns = self.cooldowns.practice_turns.saturating_sub(1);
    }

    /// Non-mutating check: is there a pending follow-through that has not
    /// yet expired?
    pub fn followthrough_pending(&self, expiry_turns: u32) -> bool {
        self.pending_followthrough
            .as_ref()
            .is_some_and(|p| self.turn_index.saturating_sub(p.created_turn) <= expiry_turns)
    }

    /// Clear the pending follow-through if it is older than `expiry_turns`.
    /// Returns true if an unexpired follow-through remains.
    pub fn followthrough_live(&mut self, expiry_turns: u32) -> bool {
        match &self.pending_followthrough {
            Some(pending) if self.turn_index.saturating_sub(pending.created_turn) > expiry_turns => {
                self.pending_followthrough = None;
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Record one exchange in the bounded history buffer.
    pub fn record_exchange(&mut self, user_text: &str, agent_text: &str, cap: usize) {
        self.push_history(Role::User, user_text, cap);
        self.push_history(Role::Agent, agent_text, cap);
        self.last_user_text = user_text.to_string();
        self.last_agent_text = agent_text.to_string();
        self.last_updated = Some(Utc::now());
    }

    fn push_history(&mut self, role: Role, content: &str, cap: usize) {
        self.history.push_back(HistoryEntry {
            role,
            content: content.to_string(),
        });
        while self.history.len() > cap {
            self.history.pop_front();
        }
    }
}
