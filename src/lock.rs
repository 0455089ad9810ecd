//! Process-wide serialization of identity switches.
//!
//! The filesystem-check identity is one global pair shared by every thread in
//! the process, not a per-thread or per-guard value. Two bracketed operations
//! running concurrently would corrupt each other's effective identity, so one
//! named lock guards the entire acquire/execute/restore critical section —
//! the window of exposure is the full downstream action, not just the
//! id-change instant.

use std::sync::{Mutex, MutexGuard, TryLockError};
use std::thread;
use std::time::{Duration, Instant};

use crate::constants::LOCK_POLL_MS;
use crate::types::errors::{Error, Result};

static SWITCH_LOCK: Mutex<()> = Mutex::new(());

/// Exclusive hold on the process identity slot, kept for the full duration of
/// one bracketed operation.
#[derive(Debug)]
pub struct SwitchLockGuard {
    _inner: MutexGuard<'static, ()>,
    wait_ms: u64,
}

impl SwitchLockGuard {
    /// Time spent waiting for the previous holder, in milliseconds.
    #[must_use]
    pub fn wait_ms(&self) -> u64 {
        self.wait_ms
    }
}

/// Acquire the process-wide switch lock, blocking up to `timeout_ms`.
///
/// Waiting here is intentional backpressure: only one operation may hold the
/// switched identity at a time, system-wide.
///
/// # Errors
/// Returns a `Locking` error if the lock is still held after `timeout_ms`.
pub fn acquire_switch_lock(timeout_ms: u64) -> Result<SwitchLockGuard> {
    let t0 = Instant::now();
    loop {
        match SWITCH_LOCK.try_lock() {
            Ok(inner) => {
                return Ok(SwitchLockGuard {
                    _inner: inner,
                    wait_ms: elapsed_ms(t0),
                })
            }
            // A previous holder panicked mid-continuation. Its identity guard
            // already restored the process identity during unwind, so the
            // slot itself is clean and the poisoned lock can be taken over.
            Err(TryLockError::Poisoned(poisoned)) => {
                return Ok(SwitchLockGuard {
                    _inner: poisoned.into_inner(),
                    wait_ms: elapsed_ms(t0),
                })
            }
            Err(TryLockError::WouldBlock) => {
                if t0.elapsed() >= Duration::from_millis(timeout_ms) {
                    return Err(Error::locking(format!(
                        "timeout acquiring identity switch lock after {timeout_ms} ms"
                    )));
                }
                thread::sleep(Duration::from_millis(LOCK_POLL_MS));
            }
        }
    }
}

fn elapsed_ms(t0: Instant) -> u64 {
    u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX)
}
