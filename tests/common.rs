//! Shared test helpers for the persona crate integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use log::Level;
use serde_json::Value;

use persona::adapters::{FsIdBackend, Principal, StorageBackend};
use persona::constants::PROBE_ID;
use persona::logging::{AuditSink, FactsEmitter};
use persona::types::{Error, FsIdentity};

/// A simple in-memory emitter to capture facts during tests.
#[derive(Clone, Default)]
pub struct TestEmitter {
    pub events: Arc<Mutex<Vec<(String, String, String, Value)>>>,
}

impl TestEmitter {
    /// Captured (decision, fields) pairs for one event name.
    pub fn events_named(&self, event: &str) -> Vec<(String, Value)> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, ev, _, _)| ev == event)
            .map(|(_, _, decision, fields)| (decision.clone(), fields.clone()))
            .collect()
    }
}

impl FactsEmitter for TestEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        self.events
            .lock()
            .unwrap()
            .push((subsystem.into(), event.into(), decision.into(), fields));
    }
}

/// A no-op audit sink for tests.
#[derive(Clone, Default)]
pub struct TestAudit;

impl AuditSink for TestAudit {
    fn log(&self, _level: Level, _msg: &str) {}
}

/// Simulated platform backend with scriptable failure modes.
///
/// The honest default follows the kernel contract: every call returns the
/// previous id; the probe id reads without changing anything; any other id is
/// applied. `denying` ids are silently ignored (the documented silent-failure
/// mode), and `probe_defective` backends wrongly apply the probe id as if it
/// were a real identity.
#[derive(Clone)]
pub struct FakeFsId {
    inner: Arc<FakeInner>,
}

struct FakeInner {
    state: Mutex<(u32, u32)>,
    mutations: Mutex<Vec<(&'static str, u32, u32)>>,
    deny_uids: Vec<u32>,
    deny_gids: Vec<u32>,
    apply_probe_id: bool,
}

impl FakeFsId {
    pub fn new(uid: u32, gid: u32) -> Self {
        Self::build(uid, gid, &[], &[], false)
    }

    pub fn denying(uid: u32, gid: u32, deny_uids: &[u32], deny_gids: &[u32]) -> Self {
        Self::build(uid, gid, deny_uids, deny_gids, false)
    }

    pub fn probe_defective(uid: u32, gid: u32) -> Self {
        Self::build(uid, gid, &[], &[], true)
    }

    fn build(
        uid: u32,
        gid: u32,
        deny_uids: &[u32],
        deny_gids: &[u32],
        apply_probe_id: bool,
    ) -> Self {
        Self {
            inner: Arc::new(FakeInner {
                state: Mutex::new((uid, gid)),
                mutations: Mutex::new(Vec::new()),
                deny_uids: deny_uids.to_vec(),
                deny_gids: deny_gids.to_vec(),
                apply_probe_id,
            }),
        }
    }

    /// Effective identity pair right now.
    pub fn current(&self) -> FsIdentity {
        let st = self.inner.state.lock().unwrap();
        FsIdentity::new(st.0, st.1)
    }

    /// Every actual state change as (component, from, to), in order.
    pub fn mutations(&self) -> Vec<(&'static str, u32, u32)> {
        self.inner.mutations.lock().unwrap().clone()
    }
}

impl FsIdBackend for FakeFsId {
    fn set_fsuid(&self, uid: u32) -> u32 {
        let mut st = self.inner.state.lock().unwrap();
        let prev = st.0;
        if uid == PROBE_ID && !self.inner.apply_probe_id {
            return prev;
        }
        if self.inner.deny_uids.contains(&uid) {
            return prev;
        }
        if st.0 != uid {
            self.inner
                .mutations
                .lock()
                .unwrap()
                .push(("fsuid", st.0, uid));
            st.0 = uid;
        }
        prev
    }

    fn set_fsgid(&self, gid: u32) -> u32 {
        let mut st = self.inner.state.lock().unwrap();
        let prev = st.1;
        if gid == PROBE_ID && !self.inner.apply_probe_id {
            return prev;
        }
        if self.inner.deny_gids.contains(&gid) {
            return prev;
        }
        if st.1 != gid {
            self.inner
                .mutations
                .lock()
                .unwrap()
                .push(("fsgid", st.1, gid));
            st.1 = gid;
        }
        prev
    }
}

/// Principal resolved to an OS account.
pub struct OsUser(pub FsIdentity);

impl Principal for OsUser {
    fn fs_identity(&self) -> Option<FsIdentity> {
        Some(self.0)
    }
}

/// Principal with no OS backing (virtual account).
pub struct VirtualUser;

impl Principal for VirtualUser {
    fn fs_identity(&self) -> Option<FsIdentity> {
        None
    }
}

/// Storage backend whose OS-permission sensitivity is fixed up front.
pub struct Storage(pub bool);

impl StorageBackend for Storage {
    fn enforces_os_permissions(&self) -> bool {
        self.0
    }
}

/// Pipeline error type used by the hook tests: the host server's own error
/// enum, absorbing identity-switch errors via `From`.
#[derive(Debug)]
pub enum OpError {
    Identity(Error),
    App(&'static str),
}

impl From<Error> for OpError {
    fn from(e: Error) -> Self {
        Self::Identity(e)
    }
}
