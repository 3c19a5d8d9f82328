//! Stoa - Guided-Reflection Dialogue Engine
//!
//! Stoa turns a raw user utterance into one considered reply per turn:
//! classify intent, plan the turn, produce content (canned, guided path,
//! or an augmented generative call), then shape the text through a fixed
//! pipeline of idempotent transforms before it leaves the system.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure models, ports, and errors
//! - **Service Layer** (`services`): Classifiers, plan governor, content
//!   dispatcher, shaping pipeline, session store, turn controller
//! - **Infrastructure Layer** (`infrastructure`): Config loading, the HTTP
//!   generation client, JSON state persistence, telemetry
//! - **CLI Layer** (`cli`): Local REPL front end

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Config, GenerationConfig, IntentSignals, LensId, LoggingConfig, SessionState, Stage,
    StateConfig, Thresholds, TurnPlan, TurnRecord, TurnReply,
};
pub use domain::ports::{
    GenerationClient, GenerationRequest, StateMap, StateRepository, TelemetrySink,
};
pub use infrastructure::{ConfigError, ConfigLoader};
pub use services::{ContentDispatcher, SessionStore, TurnController};
