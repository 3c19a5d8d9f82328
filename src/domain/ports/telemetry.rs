//! Telemetry sink port.

use crate::domain::models::TurnRecord;

/// Fire-and-forget sink for per-turn telemetry records. Implementations
/// must not block the reply path.
pub trait TelemetrySink: Send + Sync {
    fn record(&self, record: &TurnRecord);
}

/// Sink that drops everything, for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTelemetrySink;

impl TelemetrySink for NullTelemetrySink {
    fn record(&self, _record: &TurnRecord) {}
}
