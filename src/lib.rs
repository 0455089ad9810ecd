#![forbid(unsafe_code)]
//! persona: scoped, serialized, reversible filesystem-identity switches.
//!
//! A server that executes filesystem operations on behalf of authenticated
//! users can move its filesystem-check identity (fsuid/fsgid) to the target
//! user for the duration of one operation, then restore it — without touching
//! the real/effective uid/gid the rest of the process runs under.
//!
//! Safety model highlights:
//! - The underlying id-change calls never report failure, so every change
//!   goes through one verified-change primitive that confirms the requested
//!   id with a sentinel probe and re-asserts it on platforms that misapply
//!   the probe id (`guard`).
//! - Restoration is a guard object whose drop runs on every exit path,
//!   including unwinding; restore trouble is diagnostics-only.
//! - The identity pair is process-global state, so the entire
//!   acquire/execute/restore critical section runs under one named
//!   process-wide lock (`lock`).
//! - This crate forbids `unsafe` and uses `nix` for syscalls.

pub mod adapters;
pub mod api;
pub mod constants;
pub mod guard;
pub mod lock;
pub mod logging;
pub mod types;

pub use api::*;
