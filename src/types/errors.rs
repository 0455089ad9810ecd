//! Error types used across persona.
use thiserror::Error;

/// High-level error categories for switch-time failures.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Verification detected that a requested id was not actually applied.
    #[error("identity switch failed")]
    SwitchFailed,
    /// The process-wide switch lock was not acquired within the timeout.
    #[error("lock acquisition failed")]
    Locking,
}

/// Structured error with a kind and human message.
#[derive(Debug, Error)]
#[error("{kind:?}: {msg}")]
pub struct Error {
    pub kind: ErrorKind,
    pub msg: String,
}

impl Error {
    pub(crate) fn switch_failed(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::SwitchFailed,
            msg: msg.into(),
        }
    }

    pub(crate) fn locking(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Locking,
            msg: msg.into(),
        }
    }
}

/// Convenient alias for results returning a `types::Error`.
pub type Result<T> = std::result::Result<T, Error>;

// Stable identifiers emitted in facts. SCREAMING_SNAKE_CASE matches the
// emitted strings.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorId {
    E_SWITCH,
    E_LOCKING,
    E_RESTORE,
}

#[must_use]
pub const fn id_str(id: ErrorId) -> &'static str {
    match id {
        ErrorId::E_SWITCH => "E_SWITCH",
        ErrorId::E_LOCKING => "E_LOCKING",
        ErrorId::E_RESTORE => "E_RESTORE",
    }
}
