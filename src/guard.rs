//! Scope-bound switching of the process filesystem-check identity.
//!
//! The underlying id-change calls never report failure: they return the
//! previous id unconditionally, even for invalid input. Every change in this
//! module therefore goes through one verified-change primitive, shared by the
//! user-id and group-id paths, that confirms the requested id via a probe
//! with `PROBE_ID` and corrects environments that wrongly apply the probe id
//! itself. See `adapters::fsid::FsIdBackend` for the raw call contract.

use log::Level;
use serde_json::json;

use crate::adapters::fsid::FsIdBackend;
use crate::constants::PROBE_ID;
use crate::logging::audit::{AuditCtx, StageLogger};
use crate::types::errors::{Error, ErrorId, Result};
use crate::types::identity::FsIdentity;

/// Which of the two identity components a primitive call operates on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum IdClass {
    User,
    Group,
}

impl IdClass {
    const fn label(self) -> &'static str {
        match self {
            IdClass::User => "fsuid",
            IdClass::Group => "fsgid",
        }
    }
}

fn raw_set(backend: &dyn FsIdBackend, class: IdClass, id: u32) -> u32 {
    match class {
        IdClass::User => backend.set_fsuid(id),
        IdClass::Group => backend.set_fsgid(id),
    }
}

/// Apply `target` to one identity component and confirm it took effect.
/// Returns the previous id on success.
///
/// When the first call already returns the target, the component was at the
/// requested value and verification is skipped. Otherwise success is checked
/// by probing with `PROBE_ID`: the probe must return the id we just
/// requested, not the probe value and not anything else. On mismatch the
/// change silently failed; the previous id is re-applied and the call fails.
/// On match the target is immediately re-applied, because some environments
/// wrongly accept the probe id as a real identity and would otherwise be
/// left inconsistent.
fn change_verified(backend: &dyn FsIdBackend, class: IdClass, target: u32) -> Result<u32> {
    let prev = raw_set(backend, class, target);
    if prev == target {
        return Ok(prev);
    }
    let observed = raw_set(backend, class, PROBE_ID);
    if observed != target {
        raw_set(backend, class, prev);
        return Err(Error::switch_failed(format!(
            "{} change to {} not applied (effective id {})",
            class.label(),
            target,
            observed
        )));
    }
    raw_set(backend, class, target);
    Ok(prev)
}

/// Scope-bound handle over a switched filesystem-check identity.
///
/// Construction moves the process identity to the target pair; dropping the
/// guard restores the previous pair on every exit path, including unwinding.
/// Guards follow stack discipline: the underlying state is one global pair,
/// so nested guards must be released in reverse acquisition order, and
/// concurrent holders must be serialized through `lock::acquire_switch_lock`
/// for the whole protected scope.
pub struct IdentityGuard<'a> {
    backend: &'a dyn FsIdBackend,
    prev: FsIdentity,
    target: FsIdentity,
    switched: bool,
    diag: Option<&'a AuditCtx<'a>>,
}

impl std::fmt::Debug for IdentityGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityGuard")
            .field("prev", &self.prev)
            .field("target", &self.target)
            .field("switched", &self.switched)
            .finish_non_exhaustive()
    }
}

impl<'a> IdentityGuard<'a> {
    /// Switch the filesystem-check identity to `target`.
    ///
    /// The group id changes before the user id, so the process is never
    /// observed holding the new user id with the old group id. A user-id
    /// failure rolls the group id back to its previous value before the
    /// error propagates.
    ///
    /// # Errors
    /// Returns a `SwitchFailed` error when verification detects that a
    /// requested id was not applied; the pre-call identity is re-applied and
    /// no guard is constructed.
    pub fn acquire(backend: &'a dyn FsIdBackend, target: FsIdentity) -> Result<Self> {
        Self::acquire_inner(backend, target, None)
    }

    pub(crate) fn acquire_traced(
        backend: &'a dyn FsIdBackend,
        target: FsIdentity,
        diag: &'a AuditCtx<'a>,
    ) -> Result<Self> {
        Self::acquire_inner(backend, target, Some(diag))
    }

    fn acquire_inner(
        backend: &'a dyn FsIdBackend,
        target: FsIdentity,
        diag: Option<&'a AuditCtx<'a>>,
    ) -> Result<Self> {
        // The probe id is a read-side sentinel, never a legitimate identity.
        if target.uid == PROBE_ID || target.gid == PROBE_ID {
            return Err(Error::switch_failed(format!(
                "refusing probe id as target identity ({target})"
            )));
        }
        let prev_gid = change_verified(backend, IdClass::Group, target.gid)?;
        let prev_uid = match change_verified(backend, IdClass::User, target.uid) {
            Ok(uid) => uid,
            Err(e) => {
                // Undo the group change before surfacing the user failure.
                raw_set(backend, IdClass::Group, prev_gid);
                return Err(e);
            }
        };
        let prev = FsIdentity::new(prev_uid, prev_gid);
        let switched = prev != target;
        if let Some(ctx) = diag {
            ctx.audit.log(
                Level::Trace,
                &format!("identity switch: {prev} -> {target} (switched={switched})"),
            );
        }
        Ok(Self {
            backend,
            prev,
            target,
            switched,
            diag,
        })
    }

    /// Identity pair in effect before this guard switched.
    #[must_use]
    pub fn previous(&self) -> FsIdentity {
        self.prev
    }

    /// Identity pair this guard switched to.
    #[must_use]
    pub fn target(&self) -> FsIdentity {
        self.target
    }

    /// Whether construction changed either component.
    #[must_use]
    pub fn switched(&self) -> bool {
        self.switched
    }
}

impl Drop for IdentityGuard<'_> {
    fn drop(&mut self) {
        if !self.switched {
            return;
        }
        // Restore symmetrically to acquisition: the user id changed second,
        // so it is restored first. Failures stay inside diagnostics; drops
        // run on unwind paths and must not panic or surface errors.
        let uid_res = change_verified(self.backend, IdClass::User, self.prev.uid);
        let gid_res = change_verified(self.backend, IdClass::Group, self.prev.gid);

        let mut errors: Vec<String> = Vec::new();
        if let Err(e) = &uid_res {
            errors.push(e.to_string());
        }
        if let Err(e) = &gid_res {
            errors.push(e.to_string());
        }

        if let Some(ctx) = self.diag {
            let fields = json!({
                "prev_uid": self.target.uid,
                "prev_gid": self.target.gid,
                "requested_uid": self.prev.uid,
                "requested_gid": self.prev.gid,
            });
            let event = StageLogger::new(ctx).restore_result().merge(fields);
            if errors.is_empty() {
                ctx.audit.log(
                    Level::Trace,
                    &format!("identity restore: {} -> {}", self.target, self.prev),
                );
                event.emit_success();
            } else {
                ctx.audit.log(
                    Level::Error,
                    &format!("identity restore failed: {}", errors.join("; ")),
                );
                event.error_id(ErrorId::E_RESTORE).emit_failure();
            }
        }
    }
}
