//! Per-turn output records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::session::Stage;

/// Content-production strategy the dispatcher selected for a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Canned,
    GuidedPath,
    Generative,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Canned => "canned",
            Strategy::GuidedPath => "guided_path",
            Strategy::Generative => "generative",
        }
    }
}

/// Structured telemetry record for one processed turn. Emitted through the
/// `TelemetrySink` port, fire-and-forget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn_id: Uuid,
    pub conversation_id: String,
    pub turn_index: u32,
    pub stage: Stage,
    /// Governor rule that produced the plan.
    pub rule: String,
    pub strategy: Strategy,
    pub lenses: Vec<String>,
    pub regenerated: bool,
    pub input_chars: usize,
    pub output_chars: usize,
    pub timestamp: DateTime<Utc>,
}

/// Final reply for a turn, plus its telemetry.
#[derive(Debug, Clone)]
pub struct TurnReply {
    pub text: String,
    pub stage: Stage,
    pub record: TurnRecord,
}
