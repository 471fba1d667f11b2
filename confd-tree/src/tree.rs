//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use generational_arena::Arena;

use crate::node::{Node, NodeId, NodeKind};

/// An owned hierarchical document. A node exclusively owns its children;
/// their lifetime ends when the owning root is released (spec.md §3).
#[derive(Clone, Debug, Default)]
pub struct Tree {
    pub(crate) arena: Arena<Node>,
    pub(crate) root: Option<NodeId>,
}

impl Tree {
    pub fn new() -> Self {
        Tree { arena: Arena::new(), root: None }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.arena[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.arena[id]
    }

    pub fn try_node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// `new(name, parent?, kind)` — append to parent if any, return fresh
    /// node (spec.md §4.A).
    pub fn new_node(
        &mut self,
        kind: NodeKind,
        name: impl Into<String>,
        parent: Option<NodeId>,
    ) -> NodeId {
        let mut node = Node::new(kind, name);
        node.parent = parent;
        let id = self.arena.insert(node);

        match parent {
            Some(parent_id) => {
                if kind == NodeKind::Attribute {
                    self.arena[parent_id].attributes.push(id);
                } else {
                    self.arena[parent_id].children.push(id);
                }
            }
            None => {
                if self.root.is_none() {
                    self.root = Some(id);
                }
            }
        }

        id
    }

    /// Children of `id`, in canonical document order. Empty for non-element
    /// nodes or leaves.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.arena[id].children
    }

    pub fn attributes(&self, id: NodeId) -> &[NodeId] {
        &self.arena[id].attributes
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].parent
    }

    /// Walks from `id` toward the root, inclusive, yielding each ancestor.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |&n| self.parent(n))
    }

    /// Depth-first, pre-order traversal of `id`'s subtree (inclusive).
    pub fn traverse(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![id];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            let children = &self.arena[next].children;
            stack.extend(children.iter().rev());
            Some(next)
        })
    }

    pub fn find_child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.node(c).qname() == name)
    }
}
