//! Infrastructure layer: adapters behind the domain ports.

pub mod config;
pub mod generation;
pub mod state;
pub mod telemetry;

pub use config::loader::{ConfigError, ConfigLoader};
pub use generation::client::HttpGenerationClient;
pub use state::JsonFileStateRepository;
pub use telemetry::TracingTelemetrySink;
