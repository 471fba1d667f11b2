//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use serde::{Deserialize, Serialize};

/// One `{module, namespace, revision}` entry as read from a persisted
/// datastore file's `yang-library`/`modules-state` header (spec.md §3).
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ModuleStateEntry {
    pub module: String,
    pub namespace: String,
    pub revision: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ModuleChangeKind {
    Added,
    Deleted,
    Changed,
    Unchanged,
}

#[derive(Clone, Debug)]
pub struct ModuleStateChange {
    pub module: String,
    pub kind: ModuleChangeKind,
}

/// Classifies every module named in `on_disk` against `running` (spec.md
/// §3, "Module-state diff"): present only on disk is `Deleted` (the module
/// was dropped from the running schema set since the file was written),
/// present only in `running` is `Added`, present in both with a differing
/// revision is `Changed`, else `Unchanged`.
pub fn diff_module_state(on_disk: &[ModuleStateEntry], running: &[ModuleStateEntry]) -> Vec<ModuleStateChange> {
    let mut changes = Vec::new();

    for disk_entry in on_disk {
        match running.iter().find(|r| r.module == disk_entry.module) {
            None => changes.push(ModuleStateChange { module: disk_entry.module.clone(), kind: ModuleChangeKind::Deleted }),
            Some(run_entry) if run_entry.revision != disk_entry.revision => {
                changes.push(ModuleStateChange { module: disk_entry.module.clone(), kind: ModuleChangeKind::Changed })
            }
            Some(_) => changes.push(ModuleStateChange { module: disk_entry.module.clone(), kind: ModuleChangeKind::Unchanged }),
        }
    }
    for run_entry in running {
        if !on_disk.iter().any(|d| d.module == run_entry.module) {
            changes.push(ModuleStateChange { module: run_entry.module.clone(), kind: ModuleChangeKind::Added });
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(module: &str, revision: &str) -> ModuleStateEntry {
        ModuleStateEntry { module: module.to_string(), namespace: format!("urn:{module}"), revision: Some(revision.to_string()) }
    }

    #[test]
    fn classifies_added_deleted_changed_unchanged() {
        let on_disk = vec![entry("a", "2020-01-01"), entry("b", "2020-01-01"), entry("c", "2020-01-01")];
        let running = vec![entry("a", "2020-01-01"), entry("b", "2021-06-01"), entry("d", "2020-01-01")];

        let changes = diff_module_state(&on_disk, &running);
        let kind_of = |m: &str| changes.iter().find(|c| c.module == m).map(|c| c.kind);

        assert_eq!(kind_of("a"), Some(ModuleChangeKind::Unchanged));
        assert_eq!(kind_of("b"), Some(ModuleChangeKind::Changed));
        assert_eq!(kind_of("c"), Some(ModuleChangeKind::Deleted));
        assert_eq!(kind_of("d"), Some(ModuleChangeKind::Added));
    }
}
