//! Deterministic UUIDv5 identifiers for bracketed operations.
//!
//! The UUID namespace is derived from a stable tag (`NS_TAG`) so that the
//! same operation label maps to the same `op_id` across runs, keeping fact
//! streams comparable between executions.
use uuid::Uuid;

use crate::constants::NS_TAG;

/// Internal: return the UUID namespace used for deterministic ids.
fn namespace() -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, NS_TAG.as_bytes())
}

/// Compute the deterministic id for an operation label.
///
/// Every fact emitted while that operation is bracketed carries this id.
#[must_use]
pub fn op_id(label: &str) -> Uuid {
    Uuid::new_v5(&namespace(), label.as_bytes())
}
