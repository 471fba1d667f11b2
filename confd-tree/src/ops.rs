//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use crate::error::Error;
use crate::flags::NodeFlags;
use crate::node::{Node, NodeId, NodeKind};
use crate::order::SiblingOrder;
use crate::tree::Tree;

/// Where a freshly-created child should land among its siblings
/// (spec.md §4.A, `insert`).
#[derive(Clone, Copy, Debug)]
pub enum InsertPosition {
    First,
    Last,
    Before(NodeId),
    After(NodeId),
    /// The normal path: locate the slot via `O(log n)` binary search over
    /// the sorted siblings, using the supplied [`SiblingOrder`].
    SchemaOrder,
}

/// `copy(dst, src)` — copy name/value/attributes from `src` onto an
/// existing `dst` node. Children and flags of `dst` are untouched.
pub fn copy(tree: &mut Tree, dst: NodeId, src: NodeId) {
    let (name, prefix, value, kind) = {
        let src_node = tree.node(src);
        (
            src_node.name.clone(),
            src_node.prefix.clone(),
            src_node.value.clone(),
            src_node.kind,
        )
    };
    let src_attrs: Vec<(String, Option<String>)> = tree
        .attributes(src)
        .iter()
        .map(|&a| {
            let a = tree.node(a);
            (a.name.clone(), a.value.clone())
        })
        .collect();

    {
        let dst_node = tree.node_mut(dst);
        dst_node.name = name;
        dst_node.prefix = prefix;
        dst_node.value = value;
        dst_node.kind = kind;
    }

    // Attributes are replaced wholesale to mirror `src`.
    let old_attrs: Vec<NodeId> = tree.node(dst).attributes.clone();
    for attr in old_attrs {
        remove_subtree(tree, attr);
    }
    tree.node_mut(dst).attributes.clear();
    for (name, value) in src_attrs {
        let attr = tree.new_node(NodeKind::Attribute, name, Some(dst));
        tree.node_mut(attr).value = value;
    }
}

/// `deep_copy(src)` — recursively copy `src` (from `src_tree`) into
/// `dst_tree` under `dst_parent`, preserving flags except `MARK`
/// (spec.md §4.A).
pub fn deep_copy(
    src_tree: &Tree,
    src: NodeId,
    dst_tree: &mut Tree,
    dst_parent: Option<NodeId>,
) -> NodeId {
    let src_node = src_tree.node(src);
    let dst = dst_tree.new_node(src_node.kind, src_node.name.clone(), dst_parent);
    {
        let dst_node = dst_tree.node_mut(dst);
        dst_node.prefix = src_node.prefix.clone();
        dst_node.value = src_node.value.clone();
        dst_node.schema_path = src_node.schema_path.clone();
        dst_node.flags = src_node.flags.copy_mask();
    }

    for &attr in &src_node.attributes {
        deep_copy(src_tree, attr, dst_tree, Some(dst));
    }
    for &child in &src_node.children.clone() {
        deep_copy(src_tree, child, dst_tree, Some(dst));
    }

    dst
}

/// `purge(node)` — detach `node` from its parent and release its subtree.
pub fn purge(tree: &mut Tree, node: NodeId) {
    if let Some(parent) = tree.node(node).parent {
        let siblings = if tree.node(node).kind == NodeKind::Attribute {
            &mut tree.node_mut(parent).attributes
        } else {
            &mut tree.node_mut(parent).children
        };
        siblings.retain(|&c| c != node);
    } else if tree.root == Some(node) {
        tree.root = None;
    }

    remove_subtree(tree, node);
}

fn remove_subtree(tree: &mut Tree, node: NodeId) {
    let (children, attributes) = {
        let n = &tree.arena[node];
        (n.children.clone(), n.attributes.clone())
    };
    for child in children {
        remove_subtree(tree, child);
    }
    for attr in attributes {
        remove_subtree(tree, attr);
    }
    tree.arena.remove(node);
}

pub fn flag_set(tree: &mut Tree, node: NodeId, flags: NodeFlags) {
    tree.node_mut(node).flags.insert(flags);
}

pub fn flag_clear(tree: &mut Tree, node: NodeId, flags: NodeFlags) {
    tree.node_mut(node).flags.remove(flags);
}

pub fn flag_test(tree: &Tree, node: NodeId, flags: NodeFlags) -> bool {
    tree.node(node).flags.contains(flags)
}

/// Walks from `node` up through its ancestors (inclusive), invoking `f` on
/// each. Used to propagate flags such as `CHANGE` upward after a leaf edit.
pub fn apply_ancestor(tree: &mut Tree, node: NodeId, mut f: impl FnMut(&mut Node)) {
    let mut current = Some(node);
    while let Some(id) = current {
        f(tree.node_mut(id));
        current = tree.node(id).parent;
    }
}

/// `sort_recurse(node)` — restores the sorted-child invariant for `node`'s
/// subtree (spec.md §4.A).
pub fn sort_recurse(tree: &mut Tree, node: NodeId, order: &dyn SiblingOrder) {
    let mut children = tree.node(node).children.clone();
    children.sort_by(|&a, &b| order.compare(tree, a, b));
    tree.node_mut(node).children = children.clone();
    for child in children {
        sort_recurse(tree, child, order);
    }
}

/// `insert(parent, child, position, key_hint)` — place an already-created
/// `child` node among `parent`'s children at `position`.
///
/// `child` must already be a child of `parent` in the arena (created via
/// [`Tree::new_node`]); this only controls the slot within `parent.children`.
/// Returns [`Error::DataInvalid`] if `SchemaOrder` placement would collide
/// with an existing sibling carrying the identical key tuple/qname and the
/// schema doesn't allow repeats (see `find_index` for collision detection by
/// the caller; this function itself only orders, callers in `confd-yang`/
/// `confd-engine` are expected to check for duplicates before calling it
/// when the target is a keyed list — see `4.A edge cases`).
pub fn insert(
    tree: &mut Tree,
    parent: NodeId,
    child: NodeId,
    position: InsertPosition,
    order: &dyn SiblingOrder,
) -> Result<(), Error> {
    {
        let siblings = &mut tree.node_mut(parent).children;
        siblings.retain(|&c| c != child);
    }

    let siblings = tree.node(parent).children.clone();
    let index = match position {
        InsertPosition::First => 0,
        InsertPosition::Last => siblings.len(),
        InsertPosition::Before(x) => {
            siblings.iter().position(|&c| c == x).ok_or(Error::NodeNotFound)?
        }
        InsertPosition::After(x) => {
            siblings.iter().position(|&c| c == x).map(|i| i + 1).ok_or(Error::NodeNotFound)?
        }
        InsertPosition::SchemaOrder => {
            siblings.partition_point(|&c| order.compare(tree, c, child) == std::cmp::Ordering::Less)
        }
    };

    tree.node_mut(parent).children.insert(index, child);
    Ok(())
}

/// `find_index(parent, child_name, key_tuple)` — binary search over sorted
/// siblings for the list/leaf-list entry matching `child_name`/`key_tuple`.
/// `O(log n)` thanks to the sorted-child invariant (spec.md §4.A); this is
/// the primitive `confd-xpath`'s list-key fast path dispatches to.
pub fn find_index(
    tree: &Tree,
    parent: NodeId,
    child_name: &str,
    key_tuple: &[String],
    order: &dyn SiblingOrder,
) -> Option<NodeId> {
    let siblings = tree.children(parent);
    let idx = siblings
        .binary_search_by(|&c| order.compare_key(tree, c, child_name, key_tuple))
        .ok()?;
    Some(siblings[idx])
}

/// The kind of structural change a [`DiffEntry`] records.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChangeKind {
    Added,
    Deleted,
    Changed,
}

/// One entry of a [`diff`] result. `old`/`new` index into `old_tree`/
/// `new_tree` respectively; whichever side doesn't apply is `None`.
#[derive(Clone, Copy, Debug)]
pub struct DiffEntry {
    pub kind: ChangeKind,
    pub old: Option<NodeId>,
    pub new: Option<NodeId>,
}

/// Structural diff between `old` (in `old_tree`) and `new` (in `new_tree`).
///
/// A whole subtree that exists on only one side is reported as a single
/// `Added`/`Deleted` entry at its own root — the nearest ancestor present on
/// both sides is never itself reported as added or deleted (spec.md §4.E).
/// Leaf value changes are reported individually at the leaf, not propagated
/// upward as a container-level `Changed` entry.
pub fn diff(
    old_tree: &Tree,
    old: NodeId,
    new_tree: &Tree,
    new: NodeId,
    out: &mut Vec<DiffEntry>,
) {
    let old_node = old_tree.node(old);
    let new_node = new_tree.node(new);

    if old_node.children.is_empty() && new_node.children.is_empty() {
        if old_node.value != new_node.value {
            out.push(DiffEntry { kind: ChangeKind::Changed, old: Some(old), new: Some(new) });
        }
        return;
    }

    let mut old_children = old_node.children.clone();
    let new_children = new_node.children.clone();

    // Pair by qname (+ value, for leaf-lists/lists without distinguishable
    // keys this trait doesn't know about) in document order; the first
    // matching not-yet-consumed old child is paired with each new child.
    for &nc in &new_children {
        let nc_node = new_tree.node(nc);
        let pair_pos = old_children.iter().position(|&oc| {
            let oc_node = old_tree.node(oc);
            oc_node.qname() == nc_node.qname()
                && (oc_node.children.is_empty() || oc_node.value == nc_node.value || !nc_node.children.is_empty())
        });

        match pair_pos {
            Some(pos) => {
                let oc = old_children.remove(pos);
                diff(old_tree, oc, new_tree, nc, out);
            }
            None => out.push(DiffEntry { kind: ChangeKind::Added, old: None, new: Some(nc) }),
        }
    }

    for oc in old_children {
        out.push(DiffEntry { kind: ChangeKind::Deleted, old: Some(oc), new: None });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::LexicalOrder;

    fn build_list(tree: &mut Tree, root: NodeId, names: &[&str]) -> Vec<NodeId> {
        let mut ids = Vec::new();
        for name in names {
            let item = tree.new_node(NodeKind::Element, "item", Some(root));
            let key = tree.new_node(NodeKind::Element, "name", Some(item));
            let body = tree.new_node(NodeKind::Body, "", Some(key));
            tree.node_mut(body).value = Some(name.to_string());
            ids.push(item);
        }
        ids
    }

    #[test]
    fn sort_recurse_orders_by_qname_then_value() {
        let mut tree = Tree::new();
        let root = tree.new_node(NodeKind::Element, "config", None);
        let b = tree.new_node(NodeKind::Element, "b", Some(root));
        let a = tree.new_node(NodeKind::Element, "a", Some(root));
        sort_recurse(&mut tree, root, &LexicalOrder);
        assert_eq!(tree.children(root), &[a, b]);
    }

    #[test]
    fn purge_removes_subtree_from_arena() {
        let mut tree = Tree::new();
        let root = tree.new_node(NodeKind::Element, "config", None);
        let child = tree.new_node(NodeKind::Element, "x", Some(root));
        let grandchild = tree.new_node(NodeKind::Body, "", Some(child));
        purge(&mut tree, child);
        assert!(tree.children(root).is_empty());
        assert!(!tree.contains(child));
        assert!(!tree.contains(grandchild));
    }

    #[test]
    fn deep_copy_preserves_flags_except_mark() {
        let mut src = Tree::new();
        let root = src.new_node(NodeKind::Element, "config", None);
        flag_set(&mut src, root, NodeFlags::DEFAULT | NodeFlags::MARK);

        let mut dst = Tree::new();
        let copied = deep_copy(&src, root, &mut dst, None);
        assert!(flag_test(&dst, copied, NodeFlags::DEFAULT));
        assert!(!flag_test(&dst, copied, NodeFlags::MARK));
    }

    #[test]
    fn find_index_locates_keyed_list_entry() {
        let mut tree = Tree::new();
        let root = tree.new_node(NodeKind::Element, "config", None);
        let items = build_list(&mut tree, root, &["a", "b", "c", "d"]);
        sort_recurse(&mut tree, root, &LexicalOrder);
        let found = find_index(&tree, root, "item", &["c".to_string()], &LexicalOrder);
        assert_eq!(found, Some(items[2]));
    }

    #[test]
    fn diff_collapses_added_subtree_to_one_entry() {
        let mut old_tree = Tree::new();
        let old_root = old_tree.new_node(NodeKind::Element, "config", None);

        let mut new_tree = Tree::new();
        let new_root = new_tree.new_node(NodeKind::Element, "config", None);
        let new_iface = new_tree.new_node(NodeKind::Element, "interface", Some(new_root));
        let name = new_tree.new_node(NodeKind::Element, "name", Some(new_iface));
        let body = new_tree.new_node(NodeKind::Body, "", Some(name));
        new_tree.node_mut(body).value = Some("eth0".to_string());

        let mut out = Vec::new();
        diff(&old_tree, old_root, &new_tree, new_root, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, ChangeKind::Added);
        assert_eq!(out[0].new, Some(new_iface));
    }

    #[test]
    fn diff_reports_leaf_value_change() {
        let mut old_tree = Tree::new();
        let old_root = old_tree.new_node(NodeKind::Element, "config", None);
        let old_leaf = old_tree.new_node(NodeKind::Element, "mtu", Some(old_root));
        let old_body = old_tree.new_node(NodeKind::Body, "", Some(old_leaf));
        old_tree.node_mut(old_body).value = Some("1500".to_string());

        let mut new_tree = Tree::new();
        let new_root = new_tree.new_node(NodeKind::Element, "config", None);
        let new_leaf = new_tree.new_node(NodeKind::Element, "mtu", Some(new_root));
        let new_body = new_tree.new_node(NodeKind::Body, "", Some(new_leaf));
        new_tree.node_mut(new_body).value = Some("9000".to_string());

        let mut out = Vec::new();
        diff(&old_tree, old_root, &new_tree, new_root, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, ChangeKind::Changed);
    }
}
