//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Generic, YANG-agnostic hierarchical tree model (spec.md §4.A).
//!
//! Nodes live in a [`generational_arena::Arena`] owned by a [`Tree`]; parent
//! and child links are arena indices rather than owning pointers. Anything
//! that needs to order or key siblings by YANG semantics is handed an
//! explicit [`SiblingOrder`] implementation rather than the tree reaching
//! out to a YANG context itself.

pub mod error;
pub mod flags;
pub mod node;
pub mod ops;
pub mod order;
pub mod tree;

pub use error::Error;
pub use flags::NodeFlags;
pub use node::{Node, NodeId, NodeKind};
pub use ops::{
    apply_ancestor, copy, deep_copy, diff, find_index, flag_clear, flag_set, flag_test, insert,
    purge, sort_recurse, ChangeKind, DiffEntry, InsertPosition,
};
pub use order::{LexicalOrder, SiblingOrder};
pub use tree::Tree;
