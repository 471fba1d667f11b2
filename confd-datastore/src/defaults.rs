//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use confd_tree::{flag_set, NodeFlags, NodeId, NodeKind, Tree};
use confd_yang::YangIndex;
use yang3::schema::{SchemaNode, SchemaNodeKind, SchemaPathFormat};

/// How a read materialises/filters YANG-defaulted leaves (spec.md §4.D).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DefaultsMode {
    ReportAll,
    Trim,
    Explicit,
    ReportAllTagged,
}

/// Populates missing default-valued leaves under `node`, global (direct
/// children) first, then recursively into containers — mirroring the order
/// spec.md §4.D's `read` pipeline describes ("populate default values
/// (global first, then recursive)"). Every materialised leaf is flagged
/// `DEFAULT` so later defaults-mode filtering (`explicit` at serialise
/// time) can find it without re-consulting the schema.
pub fn materialize_defaults(tree: &mut Tree, node: NodeId, schema: &SchemaNode<'_>, yang: &YangIndex) {
    apply_direct_defaults(tree, node, schema, yang);

    for child in tree.children(node).to_vec() {
        let child_name = tree.node(child).name.clone();
        if let Some(child_schema) = schema.children().find(|s| s.name() == child_name) {
            bind_schema_path(tree, child, &child_schema);
            if matches!(child_schema.kind(), SchemaNodeKind::Container | SchemaNodeKind::List) {
                materialize_defaults(tree, child, &child_schema, yang);
            }
        }
    }
}

/// Same walk as [`materialize_defaults`], but against every implemented
/// module's top-level data nodes rather than a single schema node's
/// `children()`. Used both for a datastore's own document root (there is no
/// single schema node standing for "the top level of every loaded module")
/// and for a node just bound to a mounted spec (spec.md §4.F) — "children of
/// the mount point" there means "top level of the mounted module set", not a
/// child of some schema node within it.
pub fn materialize_top_level_defaults(tree: &mut Tree, node: NodeId, yang: &YangIndex) {
    apply_direct_top_level_defaults(tree, node, yang);

    for child in tree.children(node).to_vec() {
        let child_name = tree.node(child).name.clone();
        let mut top = yang.context().modules(true).flat_map(|m| m.data());
        if let Some(child_schema) = top.find(|s| s.name() == child_name) {
            bind_schema_path(tree, child, &child_schema);
            if matches!(child_schema.kind(), SchemaNodeKind::Container | SchemaNodeKind::List) {
                materialize_defaults(tree, child, &child_schema, yang);
            }
        }
    }
}

/// Stamps `node.schema_path` with `schema`'s own data path so later passes
/// (`confd-yang::order`'s sibling sort, `confd-xpath::fastpath`'s list-key
/// shortcut) can resolve the schema for this node without re-walking from
/// the root. Every visited node gets this regardless of kind, not just the
/// leaves this module defaults.
fn bind_schema_path(tree: &mut Tree, node: NodeId, schema: &SchemaNode<'_>) {
    tree.node_mut(node).schema_path = Some(schema.path(SchemaPathFormat::DATA).into());
}

fn apply_direct_defaults(tree: &mut Tree, node: NodeId, schema: &SchemaNode<'_>, _yang: &YangIndex) {
    for child_schema in schema.children() {
        if child_schema.kind() != SchemaNodeKind::Leaf || !child_schema.has_default() {
            continue;
        }
        if tree.find_child_by_name(node, child_schema.name()).is_some() {
            continue;
        }
        let Some(default_value) = child_schema.default_value_canonical() else {
            continue;
        };

        let leaf = tree.new_node(NodeKind::Element, child_schema.name().to_string(), Some(node));
        let body = tree.new_node(NodeKind::Body, "", Some(leaf));
        tree.node_mut(body).value = Some(default_value.to_string());
        bind_schema_path(tree, leaf, &child_schema);
        flag_set(tree, leaf, NodeFlags::DEFAULT);
    }
}

fn apply_direct_top_level_defaults(tree: &mut Tree, node: NodeId, yang: &YangIndex) {
    for child_schema in yang.context().modules(true).flat_map(|m| m.data()) {
        if child_schema.kind() != SchemaNodeKind::Leaf || !child_schema.has_default() {
            continue;
        }
        if tree.find_child_by_name(node, child_schema.name()).is_some() {
            continue;
        }
        let Some(default_value) = child_schema.default_value_canonical() else {
            continue;
        };

        let leaf = tree.new_node(NodeKind::Element, child_schema.name().to_string(), Some(node));
        let body = tree.new_node(NodeKind::Body, "", Some(leaf));
        tree.node_mut(body).value = Some(default_value.to_string());
        bind_schema_path(tree, leaf, &child_schema);
        flag_set(tree, leaf, NodeFlags::DEFAULT);
    }
}

/// Whether a node flagged `DEFAULT` must be hidden from a read result under
/// the given mode (spec.md §4.D: "`explicit` suppresses nodes with the
/// `DEFAULT` flag at serialise time").
pub fn suppress_at_serialize(mode: DefaultsMode, flags: NodeFlags) -> bool {
    mode == DefaultsMode::Explicit && flags.contains(NodeFlags::DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_mode_suppresses_default_flagged_nodes() {
        assert!(suppress_at_serialize(DefaultsMode::Explicit, NodeFlags::DEFAULT));
        assert!(!suppress_at_serialize(DefaultsMode::Explicit, NodeFlags::empty()));
        assert!(!suppress_at_serialize(DefaultsMode::ReportAll, NodeFlags::DEFAULT));
    }
}
