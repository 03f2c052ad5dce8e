//! Session state shared across provisioning tasks.
//!
//! A [`Session`] lives for exactly one invocation of the tool. It records
//! which idempotent actions have already been verified so that tasks which
//! compose other tasks do not repeat work. Nothing is persisted; a fresh
//! process starts with an empty store.

use parking_lot::Mutex;
use std::collections::HashSet;

/// Namespaces for memoized idempotent actions.
///
/// Package names and global tool names are independent domains; the same
/// name may appear in both without conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoDomain {
    /// A system package verified present via the package manager.
    Package,
    /// A tool installed globally via pip.
    GlobalTool,
}

#[derive(Debug, Default)]
struct MemoStore {
    packages: HashSet<String>,
    global_tools: HashSet<String>,
    cache_updated: bool,
}

impl MemoStore {
    fn set_for(&mut self, domain: MemoDomain) -> &mut HashSet<String> {
        match domain {
            MemoDomain::Package => &mut self.packages,
            MemoDomain::GlobalTool => &mut self.global_tools,
        }
    }
}

/// Per-invocation session holding the memo store.
///
/// The executor runs on an async runtime, so the store sits behind a mutex
/// even though tasks execute strictly sequentially.
#[derive(Debug, Default)]
pub struct Session {
    memo: Mutex<MemoStore>,
}

impl Session {
    /// Create a fresh session with an empty memo store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Has this action already been verified in this session?
    pub fn checked(&self, domain: MemoDomain, name: &str) -> bool {
        self.memo.lock().set_for(domain).contains(name)
    }

    /// Record an action as done. Marking twice has no additional effect.
    pub fn mark(&self, domain: MemoDomain, name: &str) {
        self.memo.lock().set_for(domain).insert(name.to_string());
    }

    /// Has the package cache been refreshed in this session?
    pub fn cache_updated(&self) -> bool {
        self.memo.lock().cache_updated
    }

    /// Record the package cache as refreshed.
    pub fn mark_cache_updated(&self) {
        self.memo.lock().cache_updated = true;
    }
}
