// Typed emission of persona facts across the switch lifecycle.
//
// Side-effects:
// - Emits JSON facts via `FactsEmitter` for the stages `skip`,
//   `switch.attempt`, `switch.result`, and `restore.result`.
// - Ensures a minimal envelope on every fact: `schema_version`, `ts`,
//   `op_id`, `stage`, `decision`.
use serde_json::{json, Value};

use crate::logging::facts::{AuditSink, FactsEmitter};
use crate::logging::redact::now_iso;
use crate::types::errors::{id_str, ErrorId};

pub(crate) const SCHEMA_VERSION: i64 = 1;

/// Emission context shared by every fact of one bracketed operation.
pub(crate) struct AuditCtx<'a> {
    pub facts: &'a dyn FactsEmitter,
    pub audit: &'a dyn AuditSink,
    pub op_id: String,
}

impl<'a> AuditCtx<'a> {
    pub(crate) fn new(
        facts: &'a dyn FactsEmitter,
        audit: &'a dyn AuditSink,
        op_id: String,
    ) -> Self {
        Self {
            facts,
            audit,
            op_id,
        }
    }
}

/// Stage for typed fact emission.
#[derive(Clone, Copy, Debug)]
pub enum Stage {
    Skip,
    SwitchAttempt,
    SwitchResult,
    RestoreResult,
}

impl Stage {
    fn as_event(self) -> &'static str {
        match self {
            Stage::Skip => "skip",
            Stage::SwitchAttempt => "switch.attempt",
            Stage::SwitchResult => "switch.result",
            Stage::RestoreResult => "restore.result",
        }
    }
}

/// Decision severity for emitted facts.
#[derive(Clone, Copy, Debug)]
pub enum Decision {
    Success,
    Failure,
}

impl Decision {
    fn as_str(self) -> &'static str {
        match self {
            Decision::Success => "success",
            Decision::Failure => "failure",
        }
    }
}

/// Builder facade over fact emission with a centralized envelope.
pub(crate) struct StageLogger<'a> {
    ctx: &'a AuditCtx<'a>,
}

impl<'a> StageLogger<'a> {
    pub(crate) fn new(ctx: &'a AuditCtx<'a>) -> Self {
        Self { ctx }
    }

    pub(crate) fn skip(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Skip)
    }

    pub(crate) fn switch_attempt(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::SwitchAttempt)
    }

    pub(crate) fn switch_result(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::SwitchResult)
    }

    pub(crate) fn restore_result(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::RestoreResult)
    }
}

pub(crate) struct EventBuilder<'a> {
    ctx: &'a AuditCtx<'a>,
    stage: Stage,
    fields: serde_json::Map<String, Value>,
}

impl<'a> EventBuilder<'a> {
    fn new(ctx: &'a AuditCtx<'a>, stage: Stage) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert("stage".to_string(), json!(stage.as_event()));
        Self { ctx, stage, fields }
    }

    pub(crate) fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub(crate) fn merge(mut self, extra: Value) -> Self {
        if let Some(obj) = extra.as_object() {
            for (k, v) in obj.iter() {
                self.fields.insert(k.clone(), v.clone());
            }
        }
        self
    }

    pub(crate) fn error_id(self, id: ErrorId) -> Self {
        self.field("error_id", json!(id_str(id)))
    }

    pub(crate) fn emit(self, decision: Decision) {
        let mut fields = Value::Object(self.fields);
        if let Some(obj) = fields.as_object_mut() {
            obj.entry("schema_version").or_insert(json!(SCHEMA_VERSION));
            obj.entry("ts").or_insert(json!(now_iso()));
            obj.entry("op_id").or_insert(json!(self.ctx.op_id));
            obj.entry("decision").or_insert(json!(decision.as_str()));
        }
        self.ctx
            .facts
            .emit("persona", self.stage.as_event(), decision.as_str(), fields);
    }

    pub(crate) fn emit_success(self) {
        self.emit(Decision::Success)
    }

    pub(crate) fn emit_failure(self) {
        self.emit(Decision::Failure)
    }
}
