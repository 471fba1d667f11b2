//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Client session identity, shared between the engine (§6 `lock`/`unlock`,
//! `kill-session`) and the datastore's lock registry (spec.md §3, "Lock
//! record").

use std::fmt;

use chrono::{DateTime, Utc};

/// Opaque client session identifier. Sessions terminate on client-gone,
/// releasing any lock they hold (spec.md §5).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct SessionId(pub u32);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A datastore's exclusive lock record: the holder session id and the time
/// the lock was acquired. `None` at the datastore means unlocked.
#[derive(Clone, Debug)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct LockRecord {
    pub holder: SessionId,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub acquired_at: DateTime<Utc>,
}

impl LockRecord {
    pub fn new(holder: SessionId, acquired_at: DateTime<Utc>) -> Self {
        LockRecord { holder, acquired_at }
    }
}
