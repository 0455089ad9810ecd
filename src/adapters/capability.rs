//! Capability queries answered by the host server, once per operation.

use crate::types::FsIdentity;

/// Resolved authenticated principal for an in-flight operation.
pub trait Principal: Send + Sync {
    /// The OS-level identity this principal maps to, or `None` when the
    /// account is not backed by an OS user (virtual accounts, anonymous
    /// logins, token-only principals).
    fn fs_identity(&self) -> Option<FsIdentity>;
}

/// Active resource backend for an in-flight operation.
pub trait StorageBackend: Send + Sync {
    /// Whether the backend stores data where the OS itself enforces per-user
    /// filesystem permissions. Object stores and in-memory backends return
    /// `false` and take the unbracketed fast path.
    fn enforces_os_permissions(&self) -> bool;
}
