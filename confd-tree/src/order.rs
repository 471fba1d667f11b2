//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use std::cmp::Ordering;

use crate::node::NodeId;
use crate::tree::Tree;

/// Supplies the canonical sibling ordering spec.md §3 calls the
/// "sorted-child invariant": schema order for containers, key-tuple lex
/// order for list entries, value lex order for leaf-lists.
///
/// The tree crate has no YANG knowledge of its own (design note: explicit
/// context passed by reference, not an ambient global), so every operation
/// that needs to know *where* a node belongs among its siblings takes an
/// implementation of this trait from `confd-yang` as an explicit parameter,
/// the same way `clixon_xml_sort.c`'s comparator is handed the relevant
/// `yang_stmt*` instead of discovering it itself.
pub trait SiblingOrder {
    /// Total order between two existing element children of the same
    /// parent. Used by `sort_recurse` and by `insert(.., SchemaOrder)`.
    fn compare(&self, tree: &Tree, a: NodeId, b: NodeId) -> Ordering;

    /// Orders a candidate sibling against a `(name, key_tuple)` search key.
    /// `key_tuple` is the list's key-leaf values in declared key order, or
    /// a single-element slice holding the value for a leaf-list search.
    /// Used by `find_index`'s binary search.
    fn compare_key(&self, tree: &Tree, candidate: NodeId, name: &str, key_tuple: &[String]) -> Ordering;
}

/// A permissive fallback order usable when no YANG binding is available:
/// lexicographic by qualified name, then by node value. Sufficient to keep
/// the sorted-child invariant well-defined for unbound (generic XML)
/// subtrees, and used by the unit tests in this crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct LexicalOrder;

impl SiblingOrder for LexicalOrder {
    fn compare(&self, tree: &Tree, a: NodeId, b: NodeId) -> Ordering {
        let na = tree.node(a);
        let nb = tree.node(b);
        na.qname().cmp(&nb.qname()).then_with(|| {
            na.value.as_deref().unwrap_or("").cmp(nb.value.as_deref().unwrap_or(""))
        })
    }

    fn compare_key(&self, tree: &Tree, candidate: NodeId, name: &str, key_tuple: &[String]) -> Ordering {
        let node = tree.node(candidate);
        node.qname().as_str().cmp(name).then_with(|| {
            let value = node.value.as_deref().unwrap_or("");
            let want = key_tuple.first().map(String::as_str).unwrap_or("");
            value.cmp(want)
        })
    }
}
