pub mod audit;
pub mod facts;
pub mod redact;

pub use audit::{Decision, Stage};
pub use facts::{AuditSink, FactsEmitter, JsonlSink};
pub use redact::{now_iso, redact_event, TS_ZERO};
