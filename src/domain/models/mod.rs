//! Domain models.

pub mod config;
pub mod intent;
pub mod plan;
pub mod session;
pub mod turn;

pub use config::{Config, GenerationConfig, LoggingConfig, StateConfig, Thresholds};
pub use intent::{CapabilityIntent, IntentSignals, Term};
pub use plan::TurnPlan;
pub use session::{
    Cooldowns, FollowThroughKind, HistoryEntry, InterestProfile, LensId, PendingFollowThrough,
    Role, SessionState, Stage, TopicLock,
};
pub use turn::{Strategy, TurnRecord, TurnReply};
