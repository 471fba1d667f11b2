//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use confd_tree::{NodeId, Tree};
use confd_yang::YangIndex;

use crate::callback::{MountCallback, MountLoader};
use crate::error::Error;

/// A data node bound before its enclosing mount point's spec was attached
/// (spec.md §4.F supplement, SPEC_FULL.md §4: "children of a mount-point
/// seen before the mount callback runs... are generic elements pending a
/// second pass").
#[derive(Clone, Debug)]
pub struct PendingBind {
    pub mount_path: Arc<str>,
    pub node: NodeId,
}

/// Component F: the schema-mount resolver (spec.md §4.F, RFC 8528/8525).
///
/// Mount specs are keyed by the canonical data path of the mount-point node
/// that declared them ("attached to the data node by canonical XPath key").
/// `mount_spec_for` walks that key space by longest-prefix match to honor
/// the "nearest mount-point ancestor, inclusive" lookup contract.
#[derive(Default)]
pub struct MountRegistry {
    pub(crate) specs: RwLock<HashMap<Arc<str>, Arc<YangIndex>>>,
    pending: RwLock<Vec<PendingBind>>,
}

impl MountRegistry {
    pub fn new() -> Self {
        MountRegistry { specs: RwLock::new(HashMap::new()), pending: RwLock::new(Vec::new()) }
    }

    /// Binds a mount point: invokes `callback.yang_lib_for`, and on a
    /// successful response, loads and attaches the mounted spec.
    pub fn bind(
        &self,
        tree: &Tree,
        node: NodeId,
        mount_path: Arc<str>,
        callback: &dyn MountCallback,
        loader: &dyn MountLoader,
    ) -> Result<Option<Arc<YangIndex>>, Error> {
        let Some(yanglib) = callback.yang_lib_for(tree, node, &mount_path) else {
            self.defer(mount_path, node);
            return Ok(None);
        };

        let ctx = loader.load(&yanglib).map_err(|e| match e {
            Error::LoadFailed { detail, .. } => {
                Error::LoadFailed { mount_path: mount_path.to_string(), detail }
            }
        })?;
        let index = Arc::new(YangIndex::new(ctx));
        self.specs.write().unwrap().insert(mount_path, index.clone());
        Ok(Some(index))
    }

    /// Queues `node` as bound against a generic element pending the mount
    /// spec named by `mount_path` becoming available.
    pub fn defer(&self, mount_path: Arc<str>, node: NodeId) {
        self.pending.write().unwrap().push(PendingBind { mount_path, node });
    }

    /// Drains and returns every pending bind whose mount spec has since
    /// become available, for the caller to rebind in a second pass.
    pub fn take_ready(&self) -> Vec<PendingBind> {
        let specs = self.specs.read().unwrap();
        let mut pending = self.pending.write().unwrap();
        let (ready, still_pending): (Vec<_>, Vec<_>) =
            pending.drain(..).partition(|p| specs.contains_key(&p.mount_path));
        *pending = still_pending;
        ready
    }

    /// `mount_spec_for(node) → option<spec>`: the spec attached at the
    /// nearest mount-point ancestor (inclusive) of `data_path`, found by
    /// longest registered-prefix match over the canonical path space.
    pub fn mount_spec_for(&self, data_path: &str) -> Option<Arc<YangIndex>> {
        let specs = self.specs.read().unwrap();
        specs
            .iter()
            .filter(|(path, _)| data_path.starts_with(path.as_ref()))
            .max_by_key(|(path, _)| path.len())
            .map(|(_, index)| index.clone())
    }

    /// Releases a mount spec. Mount specs are owned by the declaring YANG
    /// statement (spec.md §4.F, "Freeing"); this drops this registry's
    /// reference, and the `Arc<YangIndex>` is freed once every other holder
    /// (in-flight reads of a now-released mount's subtree) also drops it.
    pub fn release(&self, mount_path: &str) {
        self.specs.write().unwrap().remove(mount_path);
    }
}
