//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The plugin callback surface the commit driver (`crate::commit`) dispatches
//! into, adapted from `holo-northbound/src/configuration.rs`'s
//! `Callbacks`/`CallbacksBuilder` generics. Unlike the teacher, a callback
//! here is keyed purely by data path + change kind — there is no routing
//! daemon `ListEntry`/`Resource`/`Event` indirection because nothing in
//! spec.md's commit pipeline needs it.

use std::collections::HashMap;

use confd_tree::{NodeId, Tree};

/// The kind of structural change a commit callback fires for — mirrors
/// `confd_tree::ChangeKind`, given its own type so callback registration
/// doesn't depend on the tree diff's internal representation.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum CallbackOp {
    Create,
    Modify,
    Delete,
}

impl From<confd_tree::ChangeKind> for CallbackOp {
    fn from(kind: confd_tree::ChangeKind) -> Self {
        match kind {
            confd_tree::ChangeKind::Added => CallbackOp::Create,
            confd_tree::ChangeKind::Changed => CallbackOp::Modify,
            confd_tree::ChangeKind::Deleted => CallbackOp::Delete,
        }
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CallbackKey {
    pub path: String,
    pub operation: CallbackOp,
}

impl CallbackKey {
    pub fn new(path: impl Into<String>, operation: CallbackOp) -> Self {
        CallbackKey { path: path.into(), operation }
    }
}

/// Arguments handed to a commit callback: the two trees either side of the
/// transaction, and which node in which tree changed (spec.md §4.E: "three
/// vectors of pointers to nodes marked ADD, DEL, CHANGE").
pub struct CallbackArgs<'a> {
    pub old_tree: &'a Tree,
    pub old_node: Option<NodeId>,
    pub new_tree: &'a Tree,
    pub new_node: Option<NodeId>,
}

pub type PrepareCallback<P> = fn(&mut P, &CallbackArgs<'_>) -> Result<(), String>;
pub type PhaseTwoCallback<P> = fn(&mut P, &CallbackArgs<'_>);

pub struct CallbacksNode<P> {
    pub prepare: Option<PrepareCallback<P>>,
    pub abort: Option<PhaseTwoCallback<P>>,
    pub apply: Option<PhaseTwoCallback<P>>,
}

impl<P> Default for CallbacksNode<P> {
    fn default() -> Self {
        CallbacksNode { prepare: None, abort: None, apply: None }
    }
}

pub struct Callbacks<P>(pub HashMap<CallbackKey, CallbacksNode<P>>);

impl<P> Default for Callbacks<P> {
    fn default() -> Self {
        Callbacks(HashMap::new())
    }
}

impl<P> std::fmt::Debug for Callbacks<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Callbacks({:?})", self.0.keys().collect::<Vec<_>>())
    }
}

impl<P> Callbacks<P> {
    pub fn get(&self, key: &CallbackKey) -> Option<&CallbacksNode<P>> {
        self.0.get(key)
    }

    pub fn keys(&self) -> Vec<CallbackKey> {
        self.0.keys().cloned().collect()
    }
}

pub struct CallbacksBuilder<P> {
    path: Option<String>,
    callbacks: Callbacks<P>,
}

impl<P> Default for CallbacksBuilder<P> {
    fn default() -> Self {
        CallbacksBuilder { path: None, callbacks: Callbacks::default() }
    }
}

impl<P> CallbacksBuilder<P> {
    pub fn new(callbacks: Callbacks<P>) -> Self {
        CallbacksBuilder { path: None, callbacks }
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    fn key(&self, operation: CallbackOp) -> CallbackKey {
        CallbackKey::new(self.path.clone().expect("path() must be called before registering a callback"), operation)
    }

    #[must_use]
    pub fn create_prepare(mut self, cb: PrepareCallback<P>) -> Self {
        let key = self.key(CallbackOp::Create);
        self.callbacks.0.entry(key).or_default().prepare = Some(cb);
        self
    }

    #[must_use]
    pub fn create_abort(mut self, cb: PhaseTwoCallback<P>) -> Self {
        let key = self.key(CallbackOp::Create);
        self.callbacks.0.entry(key).or_default().abort = Some(cb);
        self
    }

    #[must_use]
    pub fn create_apply(mut self, cb: PhaseTwoCallback<P>) -> Self {
        let key = self.key(CallbackOp::Create);
        self.callbacks.0.entry(key).or_default().apply = Some(cb);
        self
    }

    #[must_use]
    pub fn modify_prepare(mut self, cb: PrepareCallback<P>) -> Self {
        let key = self.key(CallbackOp::Modify);
        self.callbacks.0.entry(key).or_default().prepare = Some(cb);
        self
    }

    #[must_use]
    pub fn modify_apply(mut self, cb: PhaseTwoCallback<P>) -> Self {
        let key = self.key(CallbackOp::Modify);
        self.callbacks.0.entry(key).or_default().apply = Some(cb);
        self
    }

    #[must_use]
    pub fn delete_prepare(mut self, cb: PrepareCallback<P>) -> Self {
        let key = self.key(CallbackOp::Delete);
        self.callbacks.0.entry(key).or_default().prepare = Some(cb);
        self
    }

    #[must_use]
    pub fn delete_apply(mut self, cb: PhaseTwoCallback<P>) -> Self {
        let key = self.key(CallbackOp::Delete);
        self.callbacks.0.entry(key).or_default().apply = Some(cb);
        self
    }

    #[must_use]
    pub fn build(self) -> Callbacks<P> {
        self.callbacks
    }
}

/// Validation callbacks run over the full candidate before any commit
/// callback fires (spec.md §4.E `validate()`).
pub type ValidationCallback = fn(&Tree, NodeId) -> Result<(), String>;

#[derive(Default)]
pub struct ValidationCallbacks(pub HashMap<String, ValidationCallback>);

impl ValidationCallbacks {
    pub fn load(&mut self, path: impl Into<String>, cb: ValidationCallback) {
        self.0.insert(path.into(), cb);
    }

    pub fn get(&self, path: &str) -> Option<&ValidationCallback> {
        self.0.get(path)
    }
}

/// A plugin registering commit and validation callbacks against the engine.
pub trait Provider: Sized + 'static {
    fn callbacks() -> &'static Callbacks<Self>;

    fn validation_callbacks() -> Option<&'static ValidationCallbacks> {
        None
    }
}
