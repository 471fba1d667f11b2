//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Ties components D (datastore), C/B (xpath/yang, via `edit`'s key lookups)
//! and E's own `edit`/`commit` together into the operations spec.md §4.E and
//! §6 name directly: `edit-config`, `commit`, `discard-changes`, `validate`.

use std::marker::PhantomData;
use std::sync::Arc;

use confd_datastore::{DatastoreStore, DefaultsMode};
use confd_tree::{NodeKind, Tree};
use confd_utils::session::SessionId;
use confd_yang::YangIndex;

use crate::callback::Provider;
use crate::commit::{self, CommitState, Transaction};
use crate::edit;
use crate::error::Error;

pub struct Engine<P: Provider> {
    store: Arc<DatastoreStore>,
    yang: Arc<YangIndex>,
    _provider: PhantomData<P>,
}

impl<P: Provider> Engine<P> {
    pub fn new(store: Arc<DatastoreStore>, yang: Arc<YangIndex>) -> Self {
        Engine { store, yang, _provider: PhantomData }
    }

    /// `get-config(source, filter?, defaults?)` / `get` (spec.md §6).
    pub fn get_config(&self, source: &str, filter: Option<&str>, defaults: DefaultsMode) -> Result<Tree, Error> {
        Ok(self.store.read(source, filter, defaults, false)?.tree)
    }

    /// `lock(target)` (spec.md §6).
    pub fn lock(&self, target: &str, session: SessionId) -> Result<(), Error> {
        self.store.lock(target, session)?;
        Ok(())
    }

    /// `unlock(target)` (spec.md §6).
    pub fn unlock(&self, target: &str, session: SessionId) -> Result<(), Error> {
        self.store.unlock(target, session)?;
        Ok(())
    }

    /// Releases every lock `session` holds (spec.md §5: "sessions terminate
    /// on client-gone"), used by `close-session`/`kill-session`.
    pub fn release_session(&self, session: SessionId) {
        self.store.release_session(session);
    }

    /// `edit-config(target, operation-default, config)` (spec.md §6):
    /// applies `patch` onto `target`'s current content and persists it.
    pub fn edit_config(&self, target: &str, patch: confd_tree::Tree) -> Result<(), Error> {
        let mut current = self.store.read(target, None, DefaultsMode::ReportAll, false)?.tree;
        let current_root = current.root().expect("read always yields a config root");
        let patch_root = patch.root().expect("patch has a config root");

        edit::edit(&mut current, current_root, &patch, patch_root, &self.yang)?;
        self.store.write(target, current)?;
        Ok(())
    }

    /// `copy-config(source, target)` (spec.md §6).
    pub fn copy_config(&self, source: &str, target: &str) -> Result<(), Error> {
        self.store.copy(source, target)?;
        Ok(())
    }

    /// `delete-config(target)` (spec.md §6).
    pub fn delete_config(&self, target: &str) -> Result<(), Error> {
        self.store.delete(target)?;
        Ok(())
    }

    /// `discard-changes` (spec.md §6): resets `candidate` back to `running`.
    pub fn discard_changes(&self) -> Result<(), Error> {
        self.store.copy("running", "candidate")?;
        Ok(())
    }

    /// `validate(source)` (spec.md §6, S0→S1).
    pub fn validate_source(&self, source: &str) -> Result<(), Error> {
        let result = self.store.read(source, None, DefaultsMode::ReportAll, false)?;
        let mut state = CommitState::Idle;
        let mounts = self.store.mounts();
        commit::validate::<P>(&result.tree, result.root, &self.yang, Some(mounts.as_ref()), &mut state)?;
        Ok(())
    }

    /// `commit` (spec.md §6, §4.E full S1→S3 pipeline): validates, prepares,
    /// applies `candidate` onto `running`; on prepare failure `candidate` is
    /// left untouched and the running datastore is unaffected.
    pub fn commit(&self, provider: &mut P) -> Result<(), Error> {
        let running = self.store.read("running", None, DefaultsMode::ReportAll, false)?;
        let candidate = self.store.read("candidate", None, DefaultsMode::ReportAll, false)?;

        let mut state = CommitState::Idle;
        let mounts = self.store.mounts();
        commit::validate::<P>(&candidate.tree, candidate.root, &self.yang, Some(mounts.as_ref()), &mut state)?;

        let mut txn = Transaction::new(&running.tree, running.root, &candidate.tree, candidate.root);
        txn.state = state;
        commit::prepare_commit(provider, &mut txn)?;
        commit::commit(provider, &mut txn);

        self.store.write("running", candidate.tree)?;
        Ok(())
    }
}

/// A fresh, empty edit-config patch rooted at `config`, ready for callers to
/// populate before handing it to [`Engine::edit_config`].
pub fn new_patch() -> confd_tree::Tree {
    let mut tree = confd_tree::Tree::new();
    tree.new_node(NodeKind::Element, "config", None);
    tree
}

#[cfg(test)]
mod tests {
    use confd_tree::NodeKind;
    use yang3::context::{Context, ContextFlags};

    use super::*;
    use crate::callback::{Callbacks, CallbacksBuilder};

    struct NoopProvider;
    impl Provider for NoopProvider {
        fn callbacks() -> &'static Callbacks<Self> {
            use std::sync::OnceLock;
            static CB: OnceLock<Callbacks<NoopProvider>> = OnceLock::new();
            CB.get_or_init(|| CallbacksBuilder::default().build())
        }
    }

    fn engine(dir: &tempfile::TempDir) -> Engine<NoopProvider> {
        let ctx = Context::new(ContextFlags::empty()).unwrap();
        let yang = Arc::new(YangIndex::new(ctx));
        let store = Arc::new(DatastoreStore::new(dir.path(), yang.clone(), confd_datastore::FileFormat::Json));
        Engine::new(store, yang)
    }

    #[test]
    fn edit_config_then_commit_moves_change_into_running() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(&dir);

        let mut patch = new_patch();
        let root = patch.root().unwrap();
        let leaf = patch.new_node(NodeKind::Element, "hostname", Some(root));
        let body = patch.new_node(NodeKind::Body, "", Some(leaf));
        patch.node_mut(body).value = Some("router1".to_string());

        engine.edit_config("candidate", patch).unwrap();

        let mut provider = NoopProvider;
        engine.commit(&mut provider).unwrap();

        let running = engine.store.read("running", None, DefaultsMode::ReportAll, false).unwrap();
        let hostname = running.tree.find_child_by_name(running.root, "hostname").unwrap();
        let body = running.tree.children(hostname)[0];
        assert_eq!(running.tree.node(body).value.as_deref(), Some("router1"));
    }

    #[test]
    fn discard_changes_resets_candidate_to_running() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(&dir);

        let mut patch = new_patch();
        let root = patch.root().unwrap();
        patch.new_node(NodeKind::Element, "hostname", Some(root));
        engine.edit_config("candidate", patch).unwrap();

        engine.discard_changes().unwrap();

        let candidate = engine.store.read("candidate", None, DefaultsMode::ReportAll, false).unwrap();
        assert!(candidate.tree.children(candidate.root).is_empty());
    }
}
