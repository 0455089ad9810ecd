//! Data-only type for a filesystem-check identity pair.
//! Centralized under `crate::types` for cross-layer reuse.

use std::fmt;

/// A filesystem-check identity: the (uid, gid) pair the OS consults for file
/// permission checks, distinct from the real/effective identity used for
/// other privilege checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FsIdentity {
    /// Filesystem-check user id.
    pub uid: u32,
    /// Filesystem-check group id.
    pub gid: u32,
}

impl FsIdentity {
    #[must_use]
    pub const fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }
}

impl fmt::Display for FsIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.uid, self.gid)
    }
}
