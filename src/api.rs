// Facade: the identity-switching middleware stage.

use log::Level;
use serde_json::json;

use crate::adapters::capability::{Principal, StorageBackend};
use crate::adapters::fsid::{FsIdBackend, NativeFsId};
use crate::constants::DEFAULT_LOCK_TIMEOUT_MS;
use crate::guard::IdentityGuard;
use crate::lock::acquire_switch_lock;
use crate::logging::audit::{AuditCtx, StageLogger};
use crate::logging::facts::{AuditSink, FactsEmitter};
use crate::types::errors::{Error, ErrorId};
use crate::types::ids::op_id;

/// In-flight operation context seen by the middleware stage.
///
/// Borrows the capability views resolved earlier in the pipeline: the
/// authenticated principal and the storage backend the operation targets.
pub struct OperationContext<'a> {
    label: &'a str,
    principal: &'a dyn Principal,
    storage: &'a dyn StorageBackend,
}

impl<'a> OperationContext<'a> {
    #[must_use]
    pub fn new(
        label: &'a str,
        principal: &'a dyn Principal,
        storage: &'a dyn StorageBackend,
    ) -> Self {
        Self {
            label,
            principal,
            storage,
        }
    }

    /// Operation label; feeds the deterministic `op_id` carried by facts.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label
    }
}

/// Identity-switching middleware stage.
///
/// Sits in an ordered pipeline of similar stages: `invoke` receives the
/// operation context plus a continuation representing the rest of the
/// pipeline, and brackets the continuation with an `IdentityGuard` when both
/// capability checks apply.
pub struct Persona<E: FactsEmitter, A: AuditSink> {
    facts: E,
    audit: A,
    backend: Box<dyn FsIdBackend>,
    lock_timeout_ms: u64,
}

impl<E: FactsEmitter, A: AuditSink> Persona<E, A> {
    pub fn new(facts: E, audit: A) -> Self {
        Self {
            facts,
            audit,
            backend: Box::new(NativeFsId),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    /// Substitute the platform backend (simulated backends in tests).
    #[must_use]
    pub fn with_fsid_backend(mut self, backend: Box<dyn FsIdBackend>) -> Self {
        self.backend = backend;
        self
    }

    #[must_use]
    pub fn with_lock_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// Run `next` under the filesystem-check identity of the operation's
    /// principal, when identity switching applies.
    ///
    /// Bracketing applies only if the principal maps to an OS identity and
    /// the storage backend relies on OS permission enforcement; otherwise
    /// `next` runs unmodified — the common fast path. When bracketing, the
    /// whole acquire/execute/restore sequence runs under the process-wide
    /// switch lock, and the guard is released before any result — value,
    /// error or unwind — propagates further up the pipeline. Restore trouble
    /// is reported through diagnostics only and never changes the outcome
    /// already determined by the continuation.
    ///
    /// # Errors
    /// Fails with this crate's `Error` (converted via `From`) when the lock
    /// or the identity switch cannot be acquired; `next` never runs in that
    /// case. `next`'s own result passes through unchanged.
    pub fn invoke<T, Err, F>(
        &self,
        ctx: &OperationContext<'_>,
        next: F,
    ) -> std::result::Result<T, Err>
    where
        Err: From<Error>,
        F: FnOnce() -> std::result::Result<T, Err>,
    {
        let tctx = AuditCtx::new(&self.facts, &self.audit, op_id(ctx.label).to_string());
        let slog = StageLogger::new(&tctx);

        let Some(target) = ctx.principal.fs_identity() else {
            self.audit.log(
                Level::Trace,
                &format!("{}: principal has no OS identity, not bracketing", ctx.label),
            );
            slog.skip()
                .field("reason", json!("principal has no OS identity"))
                .emit_success();
            return next();
        };
        if !ctx.storage.enforces_os_permissions() {
            self.audit.log(
                Level::Trace,
                &format!(
                    "{}: backend does not enforce OS permissions, not bracketing",
                    ctx.label
                ),
            );
            slog.skip()
                .field("reason", json!("backend does not enforce OS permissions"))
                .emit_success();
            return next();
        }

        slog.switch_attempt()
            .merge(json!({
                "requested_uid": target.uid,
                "requested_gid": target.gid,
            }))
            .emit_success();

        let lock = match acquire_switch_lock(self.lock_timeout_ms) {
            Ok(lock) => lock,
            Err(e) => {
                self.audit
                    .log(Level::Error, &format!("{}: {e}", ctx.label));
                slog.switch_result()
                    .merge(json!({
                        "requested_uid": target.uid,
                        "requested_gid": target.gid,
                    }))
                    .error_id(ErrorId::E_LOCKING)
                    .emit_failure();
                return Err(Err::from(e));
            }
        };

        let guard = match IdentityGuard::acquire_traced(self.backend.as_ref(), target, &tctx) {
            Ok(guard) => guard,
            Err(e) => {
                self.audit
                    .log(Level::Error, &format!("{}: {e}", ctx.label));
                slog.switch_result()
                    .merge(json!({
                        "requested_uid": target.uid,
                        "requested_gid": target.gid,
                    }))
                    .error_id(ErrorId::E_SWITCH)
                    .emit_failure();
                return Err(Err::from(e));
            }
        };

        slog.switch_result()
            .merge(json!({
                "requested_uid": target.uid,
                "requested_gid": target.gid,
                "prev_uid": guard.previous().uid,
                "prev_gid": guard.previous().gid,
                "switched": guard.switched(),
                "lock_wait_ms": lock.wait_ms(),
            }))
            .emit_success();

        let out = next();
        // Restore before the lock is released and before the result, success
        // or failure, continues up the pipeline.
        drop(guard);
        drop(lock);
        out
    }
}
