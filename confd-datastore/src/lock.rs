//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::HashMap;
use std::sync::Mutex;

use confd_utils::session::{LockRecord, SessionId};

use crate::error::Error;

/// One exclusive holder per datastore name (spec.md §4.D, §5 "Shared
/// resources: Lock registry"). Never holds two locks at once from within
/// this registry's own API — callers acquire one datastore lock at a time.
#[derive(Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<String, LockRecord>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        LockRegistry { locks: Mutex::new(HashMap::new()) }
    }

    pub fn lock(&self, datastore: &str, session: SessionId) -> Result<(), Error> {
        let mut locks = self.locks.lock().unwrap();
        if let Some(existing) = locks.get(datastore) {
            if existing.holder != session {
                return Err(Error::LockDenied { holder: existing.holder.0 });
            }
            return Ok(());
        }
        locks.insert(datastore.to_string(), LockRecord::new(session, chrono::Utc::now()));
        Ok(())
    }

    pub fn unlock(&self, datastore: &str, session: SessionId) -> Result<(), Error> {
        let mut locks = self.locks.lock().unwrap();
        match locks.get(datastore) {
            Some(existing) if existing.holder == session => {
                locks.remove(datastore);
                Ok(())
            }
            Some(_) => Err(Error::AccessDenied),
            None => Ok(()),
        }
    }

    /// Releases every lock held by `session` — called when a session
    /// terminates (spec.md §5: "sessions terminate on client-gone").
    pub fn release_session(&self, session: SessionId) {
        self.locks.lock().unwrap().retain(|_, record| record.holder != session);
    }

    pub fn holder(&self, datastore: &str) -> Option<SessionId> {
        self.locks.lock().unwrap().get(datastore).map(|r| r.holder)
    }

    /// The full lock record for `datastore`, for monitoring-state reporting
    /// (spec.md §6: "per-datastore {name, optional lock holder+time}").
    pub fn record(&self, datastore: &str) -> Option<LockRecord> {
        self.locks.lock().unwrap().get(datastore).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_excludes_other_sessions() {
        let registry = LockRegistry::new();
        registry.lock("running", SessionId(1)).unwrap();
        let err = registry.lock("running", SessionId(2)).unwrap_err();
        assert!(matches!(err, Error::LockDenied { holder: 1 }));
    }

    #[test]
    fn unlock_by_non_holder_is_access_denied() {
        let registry = LockRegistry::new();
        registry.lock("running", SessionId(1)).unwrap();
        let err = registry.unlock("running", SessionId(2)).unwrap_err();
        assert!(matches!(err, Error::AccessDenied));
    }

    #[test]
    fn release_session_drops_all_its_locks() {
        let registry = LockRegistry::new();
        registry.lock("running", SessionId(1)).unwrap();
        registry.lock("candidate", SessionId(1)).unwrap();
        registry.release_session(SessionId(1));
        assert!(registry.holder("running").is_none());
        assert!(registry.holder("candidate").is_none());
    }
}
