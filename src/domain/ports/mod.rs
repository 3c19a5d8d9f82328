//! Domain ports: boundary traits implemented by infrastructure.

pub mod generation;
pub mod state_repository;
pub mod telemetry;

pub use generation::{GenerationClient, GenerationRequest};
pub use state_repository::{NullStateRepository, StateMap, StateRepository};
pub use telemetry::{NullTelemetrySink, TelemetrySink};
