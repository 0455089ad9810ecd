//! Shared crate-wide constants for persona.
//!
//! Centralizes magic values used across modules. Adjusting these here will
//! propagate through the crate.

/// Probe identifier passed to the id-change calls to read the current value
/// without (on conforming kernels) changing it: `(uid_t)-1`, the maximum
/// representable id. The calls never report failure, so the "previous value"
/// return channel is the only way to observe the effective id. The probe id
/// is never a legitimate identity.
pub const PROBE_ID: u32 = u32::MAX;

/// Poll interval in milliseconds while waiting on the process-wide switch
/// lock (see `lock.rs`).
pub const LOCK_POLL_MS: u64 = 25;

/// Default switch-lock timeout used by `Persona::new()` unless overridden by
/// `with_lock_timeout_ms()`.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;

/// UUIDv5 namespace tag for deterministic operation ids.
pub const NS_TAG: &str = "https://persona/fs-identity";
