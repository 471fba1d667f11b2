//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

//! `edit(candidate, patch)` (spec.md §4.E): applies a tree-shaped patch to a
//! candidate tree, dispatching per element on its `operation` attribute.

use confd_tree::{deep_copy, insert, purge, sort_recurse, InsertPosition, NodeId, NodeKind, Tree};
use confd_yang::{is_list_like, YangIndex, YangOrder};

use crate::debug::Debug;
use crate::error::Error;

/// The `operation` attribute's legal values (spec.md §4.E). `Merge` is the
/// default when a patch element carries no explicit `operation`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum EditOp {
    #[default]
    Merge,
    Replace,
    Create,
    Delete,
    Remove,
    None,
}

impl EditOp {
    fn parse(value: &str) -> Self {
        match value {
            "replace" => EditOp::Replace,
            "create" => EditOp::Create,
            "delete" => EditOp::Delete,
            "remove" => EditOp::Remove,
            "none" => EditOp::None,
            _ => EditOp::Merge,
        }
    }

    fn name(self) -> &'static str {
        match self {
            EditOp::Merge => "merge",
            EditOp::Replace => "replace",
            EditOp::Create => "create",
            EditOp::Delete => "delete",
            EditOp::Remove => "remove",
            EditOp::None => "none",
        }
    }
}

/// Applies every child of `patch_node` (in `patch_tree`) onto `candidate`'s
/// children under `candidate_parent`, then restores the sorted-child
/// invariant over the whole affected subtree (spec.md §4.E: "After edit, the
/// affected subtree is re-sorted.").
pub fn edit(
    candidate: &mut Tree,
    candidate_parent: NodeId,
    patch_tree: &Tree,
    patch_node: NodeId,
    yang: &YangIndex,
) -> Result<(), Error> {
    for child in patch_tree.children(patch_node).to_vec() {
        apply_node(candidate, candidate_parent, patch_tree, child, yang)?;
    }
    let order = YangOrder { index: yang };
    sort_recurse(candidate, candidate_parent, &order);
    Ok(())
}

fn apply_node(
    candidate: &mut Tree,
    parent: NodeId,
    patch_tree: &Tree,
    patch_node: NodeId,
    yang: &YangIndex,
) -> Result<(), Error> {
    let op = operation_of(patch_tree, patch_node);
    let qname = patch_tree.node(patch_node).qname();
    Debug::Edit(op.name(), &qname).log();

    let existing = find_match(candidate, parent, patch_tree, patch_node, yang);

    match op {
        EditOp::Create => {
            if existing.is_some() {
                return Err(Error::DataExists(qname));
            }
            create_copy(candidate, parent, patch_tree, patch_node);
        }
        EditOp::Delete => match existing {
            Some(m) => purge(candidate, m),
            None => return Err(Error::DataMissing(qname)),
        },
        EditOp::Remove => {
            if let Some(m) = existing {
                purge(candidate, m);
            }
        }
        EditOp::Replace => {
            if let Some(m) = existing {
                purge(candidate, m);
            }
            create_copy(candidate, parent, patch_tree, patch_node);
        }
        EditOp::Merge => match existing {
            Some(m) => merge_into(candidate, m, patch_tree, patch_node, yang)?,
            None => create_copy(candidate, parent, patch_tree, patch_node),
        },
        EditOp::None => {
            if let Some(m) = existing {
                for child in patch_tree.children(patch_node).to_vec() {
                    apply_node(candidate, m, patch_tree, child, yang)?;
                }
            }
        }
    }

    Ok(())
}

/// `merge` on an already-present node: for a leaf, overwrite its body text;
/// for anything with element children, recurse so nested `operation`
/// attributes are still honoured.
fn merge_into(candidate: &mut Tree, existing: NodeId, patch_tree: &Tree, patch_node: NodeId, yang: &YangIndex) -> Result<(), Error> {
    let patch_body = patch_tree
        .children(patch_node)
        .iter()
        .copied()
        .find(|&c| patch_tree.node(c).kind == NodeKind::Body);

    if let Some(body) = patch_body {
        let text = patch_tree.node(body).value.clone();
        let existing_body = candidate
            .children(existing)
            .iter()
            .copied()
            .find(|&c| candidate.node(c).kind == NodeKind::Body);
        match existing_body {
            Some(b) => candidate.node_mut(b).value = text,
            None => {
                let b = candidate.new_node(NodeKind::Body, "", Some(existing));
                candidate.node_mut(b).value = text;
            }
        }
    }

    for child in patch_tree.children(patch_node).to_vec() {
        if patch_tree.node(child).kind == NodeKind::Body {
            continue;
        }
        apply_node(candidate, existing, patch_tree, child, yang)?;
    }
    Ok(())
}

/// Copies `patch_node`'s subtree (minus its `operation` attribute) into
/// `candidate` under `parent`, placed in schema order when the schema
/// resolves, otherwise appended last (re-sorted later by `edit`).
fn create_copy(candidate: &mut Tree, parent: NodeId, patch_tree: &Tree, patch_node: NodeId) {
    let copied = deep_copy(patch_tree, patch_node, candidate, Some(parent));
    if let Some(attr) = candidate
        .attributes(copied)
        .iter()
        .copied()
        .find(|&a| candidate.node(a).name == "operation")
    {
        purge(candidate, attr);
    }
    let _ = insert(candidate, parent, copied, InsertPosition::Last, &confd_tree::LexicalOrder);
}

fn operation_of(tree: &Tree, node: NodeId) -> EditOp {
    tree.attributes(node)
        .iter()
        .find(|&&a| tree.node(a).name == "operation")
        .and_then(|&a| tree.node(a).value.as_deref())
        .map(EditOp::parse)
        .unwrap_or_default()
}

/// Finds the candidate child matching `patch_node`: by full key tuple for a
/// list/leaf-list entry (resolved through `yang` when the schema binds),
/// otherwise by qualified name alone.
fn find_match(candidate: &Tree, parent: NodeId, patch_tree: &Tree, patch_node: NodeId, yang: &YangIndex) -> Option<NodeId> {
    let qname = patch_tree.node(patch_node).qname();
    let canonical = canonical_path(patch_tree, patch_node);

    if let Ok(schema) = yang.spec_of(&canonical) {
        if is_list_like(&schema) {
            let order = YangOrder { index: yang };
            let key_names = yang.key_names(&schema);
            let key_tuple: Vec<String> = if key_names.is_empty() {
                leaf_text(patch_tree, patch_node).into_iter().collect()
            } else {
                key_names.iter().map(|k| leaf_child_text(patch_tree, patch_node, k).unwrap_or_default()).collect()
            };
            return confd_tree::find_index(candidate, parent, &patch_tree.node(patch_node).name, &key_tuple, &order);
        }
    }

    candidate.find_child_by_name(parent, &qname)
}

/// Builds the data path `yang.spec_of` expects: every ancestor down to
/// `node`, excluding the synthetic `config` wrapper every tree is rooted at
/// (it isn't a real schema node, so leaving it in made every lookup here
/// fail silently and fall back to plain-qname matching).
fn canonical_path(tree: &Tree, node: NodeId) -> String {
    let mut ancestors: Vec<NodeId> = tree.ancestors(node).collect();
    ancestors.pop();
    let segments: Vec<String> = ancestors.into_iter().rev().map(|n| tree.node(n).name.clone()).collect();
    format!("/{}", segments.join("/"))
}

fn leaf_child_text(tree: &Tree, parent: NodeId, name: &str) -> Option<String> {
    let child = tree.find_child_by_name(parent, name)?;
    leaf_text(tree, child)
}

fn leaf_text(tree: &Tree, node: NodeId) -> Option<String> {
    tree.children(node)
        .iter()
        .find(|&&c| tree.node(c).kind == NodeKind::Body)
        .and_then(|&b| tree.node(b).value.clone())
}

#[cfg(test)]
mod tests {
    use confd_tree::NodeKind;
    use yang3::context::{Context, ContextFlags};

    use super::*;

    fn leaf(tree: &mut Tree, parent: NodeId, name: &str, value: &str) -> NodeId {
        let n = tree.new_node(NodeKind::Element, name, Some(parent));
        let b = tree.new_node(NodeKind::Body, "", Some(n));
        tree.node_mut(b).value = Some(value.to_string());
        n
    }

    fn yang_index() -> YangIndex {
        YangIndex::new(Context::new(ContextFlags::empty()).unwrap())
    }

    #[test]
    fn merge_creates_missing_leaf() {
        let mut candidate = Tree::new();
        let root = candidate.new_node(NodeKind::Element, "config", None);

        let mut patch = Tree::new();
        let proot = patch.new_node(NodeKind::Element, "config", None);
        leaf(&mut patch, proot, "hostname", "router1");

        let yang = yang_index();
        edit(&mut candidate, root, &patch, proot, &yang).unwrap();

        let added = candidate.find_child_by_name(root, "hostname").unwrap();
        assert_eq!(leaf_text(&candidate, added).as_deref(), Some("router1"));
    }

    #[test]
    fn create_on_existing_node_fails() {
        let mut candidate = Tree::new();
        let root = candidate.new_node(NodeKind::Element, "config", None);
        leaf(&mut candidate, root, "hostname", "old");

        let mut patch = Tree::new();
        let proot = patch.new_node(NodeKind::Element, "config", None);
        let h = leaf(&mut patch, proot, "hostname", "new");
        let attr = patch.new_node(NodeKind::Attribute, "operation", Some(h));
        patch.node_mut(attr).value = Some("create".to_string());

        let yang = yang_index();
        let err = edit(&mut candidate, root, &patch, proot, &yang).unwrap_err();
        assert!(matches!(err, Error::DataExists(_)));
    }

    #[test]
    fn delete_on_missing_node_fails() {
        let mut candidate = Tree::new();
        let root = candidate.new_node(NodeKind::Element, "config", None);

        let mut patch = Tree::new();
        let proot = patch.new_node(NodeKind::Element, "config", None);
        let h = patch.new_node(NodeKind::Element, "hostname", Some(proot));
        let attr = patch.new_node(NodeKind::Attribute, "operation", Some(h));
        patch.node_mut(attr).value = Some("delete".to_string());

        let yang = yang_index();
        let err = edit(&mut candidate, root, &patch, proot, &yang).unwrap_err();
        assert!(matches!(err, Error::DataMissing(_)));
    }

    #[test]
    fn remove_on_missing_node_is_tolerant() {
        let mut candidate = Tree::new();
        let root = candidate.new_node(NodeKind::Element, "config", None);

        let mut patch = Tree::new();
        let proot = patch.new_node(NodeKind::Element, "config", None);
        let h = patch.new_node(NodeKind::Element, "hostname", Some(proot));
        let attr = patch.new_node(NodeKind::Attribute, "operation", Some(h));
        patch.node_mut(attr).value = Some("remove".to_string());

        let yang = yang_index();
        edit(&mut candidate, root, &patch, proot, &yang).unwrap();
        assert!(candidate.find_child_by_name(root, "hostname").is_none());
    }

    #[test]
    fn merge_updates_leaf_value_in_place() {
        let mut candidate = Tree::new();
        let root = candidate.new_node(NodeKind::Element, "config", None);
        leaf(&mut candidate, root, "hostname", "old");

        let mut patch = Tree::new();
        let proot = patch.new_node(NodeKind::Element, "config", None);
        leaf(&mut patch, proot, "hostname", "new");

        let yang = yang_index();
        edit(&mut candidate, root, &patch, proot, &yang).unwrap();

        let h = candidate.find_child_by_name(root, "hostname").unwrap();
        assert_eq!(leaf_text(&candidate, h).as_deref(), Some("new"));
    }
}
