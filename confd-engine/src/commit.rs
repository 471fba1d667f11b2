//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The two-phase candidate→running commit state machine (spec.md §4.E):
//!
//! ```text
//! S0: idle
//!  └─ validate()          → S1 (validated) or S0 with RpcError
//! S1: validated
//!  └─ prepare_commit()    → S2 (prepared) or revert to S0
//! S2: prepared
//!  └─ commit()            → S3 (committed, new running) or revert to S0
//! ```
//!
//! Adapted from `holo-northbound/src/configuration.rs`'s
//! `process_validate`/`process_commit`, split into the engine's own
//! validate/prepare/commit/revert verbs with `confd_tree::diff`'s added/
//! deleted/changed triage standing in for `yang3::data::DataDiff`.

use confd_mount::MountRegistry;
use confd_tree::{diff, ChangeKind, DiffEntry, NodeId, Tree};
use confd_yang::YangIndex;
use serde::{Deserialize, Serialize};

use crate::builtin;
use crate::callback::{CallbackArgs, CallbackKey, CallbackOp, Provider, ValidationCallbacks};
use crate::debug::Debug;
use crate::error::Error;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum CommitPhase {
    Prepare,
    Abort,
    Apply,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CommitState {
    Idle,
    Validated,
    Prepared,
    Committed,
}

/// A transient value holding the two roots either side of a commit and the
/// classified diff between them (spec.md §3 "Transaction").
pub struct Transaction<'a> {
    pub source: &'a Tree,
    pub source_root: NodeId,
    pub target: &'a Tree,
    pub target_root: NodeId,
    pub entries: Vec<DiffEntry>,
    pub state: CommitState,
}

impl<'a> Transaction<'a> {
    pub fn new(source: &'a Tree, source_root: NodeId, target: &'a Tree, target_root: NodeId) -> Self {
        let mut entries = Vec::new();
        diff(source, source_root, target, target_root, &mut entries);
        Transaction { source, source_root, target, target_root, entries, state: CommitState::Idle }
    }

    fn key_of(&self, entry: &DiffEntry) -> CallbackKey {
        let operation: CallbackOp = entry.kind.into();
        let node = match entry.kind {
            ChangeKind::Deleted => (self.source, entry.old.unwrap()),
            _ => (self.target, entry.new.unwrap()),
        };
        CallbackKey::new(canonical_path(node.0, node.1), operation)
    }

    fn args(&self, entry: &DiffEntry) -> CallbackArgs<'_> {
        CallbackArgs { old_tree: self.source, old_node: entry.old, new_tree: self.target, new_node: entry.new }
    }
}

fn canonical_path(tree: &Tree, node: NodeId) -> String {
    let mut segments: Vec<String> = tree.ancestors(node).map(|n| tree.node(n).name.clone()).collect();
    segments.reverse();
    format!("/{}", segments.join("/"))
}

/// `validate()` (spec.md §4.E S0→S1): runs the built-in schema-walk checks
/// (mandatory, min-/max-elements, type conformance — see `builtin::check`
/// for what this binding can and can't enforce) over the target tree, then
/// every registered application `ValidationCallback`. Every check runs
/// regardless of earlier failures, so a single call reports every violation
/// at once rather than only the first one encountered. `mounts`, when given,
/// lets the built-in pass resolve a node beneath a mount point against its
/// attached spec (spec.md §4.F) instead of `yang`.
pub fn validate<P: Provider>(
    target: &Tree,
    target_root: NodeId,
    yang: &YangIndex,
    mounts: Option<&MountRegistry>,
    txn_state: &mut CommitState,
) -> Result<(), Error> {
    let mut failures = Vec::new();
    builtin::check(target, target_root, yang, mounts, &mut failures);

    if let Some(callbacks) = P::validation_callbacks() {
        for node in target.traverse(target_root) {
            let path = canonical_path(target, node);
            if let Some(cb) = callbacks.get(&path) {
                Debug::ValidationCallback(&path).log();
                if let Err(detail) = (*cb)(target, node) {
                    failures.push(detail);
                }
            }
        }
    }

    if !failures.is_empty() {
        return Err(Error::ValidationCallback(failures.join("; ")));
    }
    *txn_state = CommitState::Validated;
    Ok(())
}

/// `prepare_commit()` (spec.md §4.E S1→S2): fires every `prepare` callback
/// in diff order. On the first failure, every callback that already ran is
/// rolled back via its `abort` callback and the transaction is left at
/// `Idle` — "revert to S0".
pub fn prepare_commit<P: Provider>(provider: &mut P, txn: &mut Transaction<'_>) -> Result<(), Error> {
    debug_assert_eq!(txn.state, CommitState::Validated);
    let callbacks = P::callbacks();

    for (i, entry) in txn.entries.iter().enumerate() {
        let key = txn.key_of(entry);
        Debug::ConfigurationCallback(CommitPhase::Prepare, key.operation, &key.path).log();

        let Some(node) = callbacks.get(&key) else { continue };
        let Some(prepare) = node.prepare else { continue };

        let args = txn.args(entry);
        if let Err(detail) = prepare(provider, &args) {
            revert(provider, txn, i);
            return Err(Error::PrepareCallback(detail));
        }
    }

    txn.state = CommitState::Prepared;
    Ok(())
}

/// `commit()` (spec.md §4.E S2→S3): fires every `apply` callback. Apply
/// callbacks are infallible, matching the teacher's `CallbackPhaseTwo`
/// signature — by this point `prepare_commit` has already validated that
/// every change can be applied.
pub fn commit<P: Provider>(provider: &mut P, txn: &mut Transaction<'_>) {
    debug_assert_eq!(txn.state, CommitState::Prepared);
    let callbacks = P::callbacks();

    for entry in &txn.entries {
        let key = txn.key_of(entry);
        Debug::ConfigurationCallback(CommitPhase::Apply, key.operation, &key.path).log();

        if let Some(apply) = callbacks.get(&key).and_then(|n| n.apply) {
            let args = txn.args(entry);
            apply(provider, &args);
        }
    }

    txn.state = CommitState::Committed;
}

/// `revert to S0`: runs `abort` on the first `prepared_count` entries, in
/// reverse order (spec.md §4.E: "calls each callback that has already seen
/// prepare with a revert signal in reverse registration order").
fn revert<P: Provider>(provider: &mut P, txn: &mut Transaction<'_>, prepared_count: usize) {
    let callbacks = P::callbacks();
    for entry in txn.entries[..prepared_count].iter().rev() {
        let key = txn.key_of(entry);
        Debug::ConfigurationCallback(CommitPhase::Abort, key.operation, &key.path).log();
        if let Some(abort) = callbacks.get(&key).and_then(|n| n.abort) {
            let args = txn.args(entry);
            abort(provider, &args);
        }
    }
    txn.state = CommitState::Idle;
}

#[cfg(test)]
mod tests {
    use confd_tree::NodeKind;
    use yang3::context::{Context, ContextFlags};

    use super::*;
    use crate::callback::{Callbacks, CallbacksBuilder};

    fn empty_yang() -> YangIndex {
        YangIndex::new(Context::new(ContextFlags::empty()).unwrap())
    }

    struct TestProvider {
        prepared: Vec<String>,
        applied: Vec<String>,
        aborted: Vec<String>,
    }

    impl Provider for TestProvider {
        fn callbacks() -> &'static Callbacks<Self> {
            use std::sync::OnceLock;
            static CB: OnceLock<Callbacks<TestProvider>> = OnceLock::new();
            CB.get_or_init(|| {
                CallbacksBuilder::default()
                    .path("/config/hostname")
                    .create_prepare(|p: &mut TestProvider, args| {
                        p.prepared.push(format!("{:?}", args.new_node.is_some()));
                        Ok(())
                    })
                    .create_apply(|p: &mut TestProvider, _args| p.applied.push("hostname".to_string()))
                    .create_abort(|p: &mut TestProvider, _args| p.aborted.push("hostname".to_string()))
                    .build()
            })
        }
    }

    struct RevertingProvider {
        aborted: Vec<String>,
    }

    impl Provider for RevertingProvider {
        fn callbacks() -> &'static Callbacks<Self> {
            use std::sync::OnceLock;
            static CB: OnceLock<Callbacks<RevertingProvider>> = OnceLock::new();
            CB.get_or_init(|| {
                CallbacksBuilder::default()
                    .path("/config/hostname")
                    .create_prepare(|_: &mut RevertingProvider, _args| Ok(()))
                    .create_abort(|p: &mut RevertingProvider, _args| p.aborted.push("hostname".to_string()))
                    .path("/config/location")
                    .create_prepare(|_: &mut RevertingProvider, _args| Err("location rejected".to_string()))
                    .build()
            })
        }
    }

    struct RejectingValidationProvider;

    fn reject_hostname(_tree: &Tree, _node: NodeId) -> Result<(), String> {
        Err("hostname rejected".to_string())
    }

    fn reject_location(_tree: &Tree, _node: NodeId) -> Result<(), String> {
        Err("location rejected".to_string())
    }

    impl Provider for RejectingValidationProvider {
        fn callbacks() -> &'static Callbacks<Self> {
            use std::sync::OnceLock;
            static CB: OnceLock<Callbacks<RejectingValidationProvider>> = OnceLock::new();
            CB.get_or_init(|| CallbacksBuilder::default().build())
        }

        fn validation_callbacks() -> Option<&'static ValidationCallbacks> {
            use std::sync::OnceLock;
            static CB: OnceLock<ValidationCallbacks> = OnceLock::new();
            Some(CB.get_or_init(|| {
                let mut callbacks = ValidationCallbacks::default();
                callbacks.load("/config/hostname", reject_hostname);
                callbacks.load("/config/location", reject_location);
                callbacks
            }))
        }
    }

    #[test]
    fn validate_runs_every_callback_and_reports_every_failure() {
        let mut tree = Tree::new();
        let root = tree.new_node(NodeKind::Element, "config", None);
        let hostname = tree.new_node(NodeKind::Element, "hostname", Some(root));
        let body = tree.new_node(NodeKind::Body, "", Some(hostname));
        tree.node_mut(body).value = Some("router1".to_string());
        let location = tree.new_node(NodeKind::Element, "location", Some(root));
        let body = tree.new_node(NodeKind::Body, "", Some(location));
        tree.node_mut(body).value = Some("rack1".to_string());

        let mut state = CommitState::Idle;
        let yang = empty_yang();
        let err = validate::<RejectingValidationProvider>(&tree, root, &yang, None, &mut state).unwrap_err();

        let Error::ValidationCallback(detail) = err else {
            panic!("expected ValidationCallback error, got {err:?}");
        };
        assert!(detail.contains("hostname rejected"));
        assert!(detail.contains("location rejected"));
        assert_eq!(state, CommitState::Idle);
    }

    fn tree_with_hostname(value: &str) -> (Tree, NodeId) {
        let mut tree = Tree::new();
        let root = tree.new_node(NodeKind::Element, "config", None);
        let leaf = tree.new_node(NodeKind::Element, "hostname", Some(root));
        let body = tree.new_node(NodeKind::Body, "", Some(leaf));
        tree.node_mut(body).value = Some(value.to_string());
        (tree, root)
    }

    #[test]
    fn prepare_then_commit_invokes_apply_not_abort() {
        let (source, source_root) = {
            let mut t = Tree::new();
            let r = t.new_node(NodeKind::Element, "config", None);
            (t, r)
        };
        let (target, target_root) = tree_with_hostname("router1");

        let mut provider = TestProvider { prepared: vec![], applied: vec![], aborted: vec![] };
        let mut state = CommitState::Idle;
        let yang = empty_yang();
        validate::<TestProvider>(&target, target_root, &yang, None, &mut state).unwrap();

        let mut txn = Transaction::new(&source, source_root, &target, target_root);
        txn.state = state;
        prepare_commit(&mut provider, &mut txn).unwrap();
        commit(&mut provider, &mut txn);

        assert_eq!(provider.applied, vec!["hostname".to_string()]);
        assert!(provider.aborted.is_empty());
        assert_eq!(txn.state, CommitState::Committed);
    }

    #[test]
    fn prepare_failure_reverts_already_prepared_entries_and_leaves_state_idle() {
        let (source, source_root) = {
            let mut t = Tree::new();
            let r = t.new_node(NodeKind::Element, "config", None);
            (t, r)
        };
        let (target, target_root) = {
            let mut t = Tree::new();
            let r = t.new_node(NodeKind::Element, "config", None);
            let hostname = t.new_node(NodeKind::Element, "hostname", Some(r));
            let body = t.new_node(NodeKind::Body, "", Some(hostname));
            t.node_mut(body).value = Some("router1".to_string());
            let location = t.new_node(NodeKind::Element, "location", Some(r));
            let body = t.new_node(NodeKind::Body, "", Some(location));
            t.node_mut(body).value = Some("rack1".to_string());
            (t, r)
        };

        let mut provider = RevertingProvider { aborted: vec![] };
        let mut state = CommitState::Idle;
        let yang = empty_yang();
        validate::<RevertingProvider>(&target, target_root, &yang, None, &mut state).unwrap();

        let mut txn = Transaction::new(&source, source_root, &target, target_root);
        txn.state = state;
        let err = prepare_commit(&mut provider, &mut txn).unwrap_err();

        assert!(matches!(err, Error::PrepareCallback(_)));
        assert_eq!(provider.aborted, vec!["hostname".to_string()]);
        assert_eq!(txn.state, CommitState::Idle);
    }
}
