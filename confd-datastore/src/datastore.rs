//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use confd_tree::{NodeId, Tree};
use confd_utils::session::LockRecord;

use crate::module_state::ModuleStateEntry;

/// A named tree with its version, emptiness, lock snapshot, and the
/// module-state it was last loaded with (spec.md §3 "Datastore").
pub struct Datastore {
    pub name: String,
    pub tree: Tree,
    pub version: u64,
    pub empty: bool,
    /// Mirrors whatever [`crate::lock::LockRegistry`] currently holds for
    /// this name; the registry, not this field, arbitrates contention.
    pub lock: Option<LockRecord>,
    pub module_state: Vec<ModuleStateEntry>,
}

impl Datastore {
    /// A fresh, empty datastore rooted at a bare `config` element (spec.md
    /// §3 invariant: "The root of every loaded datastore is named `config`
    /// and has no body children.").
    pub fn empty(name: impl Into<String>) -> Self {
        let mut tree = Tree::new();
        tree.new_node(confd_tree::NodeKind::Element, "config", None);
        Datastore { name: name.into(), tree, version: 0, empty: true, lock: None, module_state: Vec::new() }
    }

    pub fn root(&self) -> NodeId {
        self.tree.root().expect("datastore tree always has a config root")
    }

    /// Replaces the tree wholesale and bumps the version (spec.md §4.D
    /// `write`).
    pub fn replace(&mut self, tree: Tree, module_state: Vec<ModuleStateEntry>) {
        self.empty = tree.children(tree.root().expect("loaded tree has a root")).is_empty();
        self.tree = tree;
        self.module_state = module_state;
        self.version += 1;
    }

    /// Empties the datastore in place, keeping its name and lock but
    /// resetting content and bumping the version (spec.md §4.D `delete`).
    pub fn clear(&mut self) {
        let mut tree = Tree::new();
        tree.new_node(confd_tree::NodeKind::Element, "config", None);
        self.tree = tree;
        self.empty = true;
        self.module_state.clear();
        self.version += 1;
    }
}
