//! Platform interface to the filesystem-check identity calls.

/// Raw access to the two id-change calls.
///
/// Both calls follow the kernel contract of `setfsuid(2)`/`setfsgid(2)`:
/// they take the requested id, return the **previous** id, and never report
/// failure — not even for invalid input. An out-of-range probe id
/// (`constants::PROBE_ID`) reads the current value through the same return
/// channel and must never be treated as a real identity. Production
/// implementations mutate process-global state; callers go through
/// `guard::IdentityGuard`, which owns the verification workaround.
pub trait FsIdBackend: Send + Sync {
    /// Request `uid` as the filesystem-check user id; returns the previous one.
    fn set_fsuid(&self, uid: u32) -> u32;

    /// Request `gid` as the filesystem-check group id; returns the previous one.
    fn set_fsgid(&self, gid: u32) -> u32;
}

/// Production backend over the host syscalls.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeFsId;

impl FsIdBackend for NativeFsId {
    fn set_fsuid(&self, uid: u32) -> u32 {
        nix::unistd::setfsuid(nix::unistd::Uid::from_raw(uid)).as_raw()
    }

    fn set_fsgid(&self, gid: u32) -> u32 {
        nix::unistd::setfsgid(nix::unistd::Gid::from_raw(gid)).as_raw()
    }
}
