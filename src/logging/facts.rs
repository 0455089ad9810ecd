use log::Level;
use serde_json::Value;

/// Structured facts stream: one JSON event per decision point.
pub trait FactsEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value);
}

/// Human-oriented leveled audit lines.
pub trait AuditSink {
    fn log(&self, level: Level, msg: &str);
}

/// Default sink: forwards audit lines to the `log` macros and serializes
/// each fact as a single JSON line at debug level.
#[derive(Default)]
pub struct JsonlSink;

impl FactsEmitter for JsonlSink {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        log::debug!(
            target: "persona::facts",
            "{}",
            serde_json::json!({
                "subsystem": subsystem,
                "event": event,
                "decision": decision,
                "fields": fields,
            })
        );
    }
}

impl AuditSink for JsonlSink {
    fn log(&self, level: Level, msg: &str) {
        log::log!(target: "persona::audit", level, "{msg}");
    }
}
