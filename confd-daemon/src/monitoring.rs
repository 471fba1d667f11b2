//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The read-only monitoring-state subtree (spec.md §6 "Monitoring state"),
//! shaped after RFC 6022's `netconf-state` container the way
//! `clixon_netconf_monitoring.c` assembles it: per-datastore lock info,
//! schema inventory, and running session counters.

use chrono::{DateTime, Utc};
use confd_datastore::DatastoreStore;
use confd_utils::session::SessionId;
use confd_yang::YangIndex;
use serde::Serialize;

#[derive(Debug, Default, Serialize)]
pub struct SessionStats {
    pub in_sessions: u64,
    pub dropped_sessions: u64,
    pub in_rpcs: u64,
    pub in_bad_rpcs: u64,
    pub out_rpc_errors: u64,
    pub out_notifications: u64,
    pub in_bad_hellos: u64,
}

#[derive(Debug, Serialize)]
pub struct DatastoreLock {
    pub locked_by_session: u32,
    pub locked_time: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct DatastoreState {
    pub name: String,
    pub lock: Option<DatastoreLock>,
}

#[derive(Debug, Serialize)]
pub struct Schema {
    pub identifier: String,
    pub revision: Option<String>,
    pub format: &'static str,
    pub namespace: String,
    pub location: String,
}

#[derive(Debug, Serialize)]
pub struct MonitoringState {
    pub capabilities: Vec<String>,
    pub datastores: Vec<DatastoreState>,
    pub schemas: Vec<Schema>,
    pub statistics: SessionStats,
    pub netconf_start_time: DateTime<Utc>,
}

const CAPABILITIES: &[&str] = &[
    "urn:ietf:params:netconf:base:1.1",
    "urn:ietf:params:netconf:capability:candidate:1.0",
    "urn:ietf:params:netconf:capability:validate:1.1",
    "urn:ietf:params:netconf:capability:xpath:1.0",
];

/// Tracks the subset of §6's monitoring state the daemon loop itself owns
/// (session counters); datastore lock state and the schema inventory are
/// pulled live from `confd-datastore`/`confd-yang` at read time.
pub struct Monitoring {
    pub stats: SessionStats,
    pub start_time: DateTime<Utc>,
}

impl Monitoring {
    pub fn new() -> Self {
        Monitoring { stats: SessionStats::default(), start_time: Utc::now() }
    }

    pub fn record_session_opened(&mut self) {
        self.stats.in_sessions += 1;
    }

    pub fn record_session_dropped(&mut self) {
        self.stats.dropped_sessions += 1;
    }

    pub fn record_rpc(&mut self, ok: bool) {
        self.stats.in_rpcs += 1;
        if !ok {
            self.stats.in_bad_rpcs += 1;
            self.stats.out_rpc_errors += 1;
        }
    }

    pub fn record_notification(&mut self) {
        self.stats.out_notifications += 1;
    }

    pub fn record_bad_hello(&mut self) {
        self.stats.in_bad_hellos += 1;
    }

    pub fn snapshot(&self, store: &DatastoreStore, yang: &YangIndex, netconf_monitoring_location: &str) -> MonitoringState {
        let datastores = ["running", "candidate", "startup"]
            .into_iter()
            .map(|name| DatastoreState {
                name: name.to_string(),
                lock: store.lock_holder(name).map(|(holder, acquired_at)| DatastoreLock {
                    locked_by_session: session_as_u32(holder),
                    locked_time: acquired_at,
                }),
            })
            .collect();

        let schemas = yang
            .context()
            .modules(true)
            .map(|m| Schema {
                identifier: m.name().to_string(),
                revision: m.revision().map(str::to_string),
                format: "yang",
                namespace: m.namespace().to_string(),
                location: netconf_monitoring_location.to_string(),
            })
            .collect();

        MonitoringState {
            capabilities: CAPABILITIES.iter().map(|s| s.to_string()).collect(),
            datastores,
            schemas,
            statistics: SessionStats {
                in_sessions: self.stats.in_sessions,
                dropped_sessions: self.stats.dropped_sessions,
                in_rpcs: self.stats.in_rpcs,
                in_bad_rpcs: self.stats.in_bad_rpcs,
                out_rpc_errors: self.stats.out_rpc_errors,
                out_notifications: self.stats.out_notifications,
                in_bad_hellos: self.stats.in_bad_hellos,
            },
            netconf_start_time: self.start_time,
        }
    }
}

fn session_as_u32(id: SessionId) -> u32 {
    id.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_monitoring_has_zeroed_counters() {
        let m = Monitoring::new();
        assert_eq!(m.stats.in_sessions, 0);
        assert_eq!(m.stats.in_rpcs, 0);
    }

    #[test]
    fn record_bad_rpc_bumps_both_bad_rpcs_and_rpc_errors() {
        let mut m = Monitoring::new();
        m.record_rpc(false);
        assert_eq!(m.stats.in_rpcs, 1);
        assert_eq!(m.stats.in_bad_rpcs, 1);
        assert_eq!(m.stats.out_rpc_errors, 1);
    }
}
