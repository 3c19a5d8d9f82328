//! Tracing-backed telemetry sink.

use tracing::info;

use crate::domain::models::TurnRecord;
use crate::domain::ports::TelemetrySink;

/// Emits one structured `turn` event per record. Synchronous and cheap;
/// never blocks the reply path.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetrySink;

impl TelemetrySink for TracingTelemetrySink {
    fn record(&self, record: &TurnRecord) {
        info!(
            target: "stoa::turn",
            turn_id = %record.turn_id,
            conversation = %record.conversation_id,
            turn = record.turn_index,
            stage = record.stage.as_str(),
            rule = %record.rule,
            strategy = record.strategy.as_str(),
            lenses = ?record.lenses,
            regenerated = record.regenerated,
            input_chars = record.input_chars,
            output_chars = record.output_chars,
            "turn processed"
        );
    }
}
