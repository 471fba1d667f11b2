//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::Arc;

use crate::flags::NodeFlags;

/// Stable handle into a [`crate::Tree`]'s arena. Parent/child links are
/// indices rather than owning pointers (design note: "use an arena... so
/// that parent links are indices, not owning pointers").
pub type NodeId = generational_arena::Index;

/// The kind of data a node carries, per spec.md §3: "A node is one of the
/// variants Element / Attribute / Body / Comment / PI."
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NodeKind {
    Element,
    Attribute,
    Body,
    Comment,
    Pi,
}

/// A single node in the generic hierarchical tree. Every node carries name,
/// optional namespace prefix, optional parent, ordered child list, optional
/// YANG back-reference, and the flag mask of spec.md §3.
///
/// The YANG back-reference is kept deliberately lightweight: a clonable
/// canonical data-path key (see GLOSSARY, "Canonical XPath") rather than a
/// borrowed schema-node handle, so the tree crate stays independent of the
/// YANG context's lifetime. Anything that needs the full statement resolves
/// it through `confd-yang`'s index, passing this path as the key — the same
/// "explicit context passed by reference" pattern spec.md §9 calls for in
/// place of an ambient global handle.
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub name: String,
    pub prefix: Option<String>,
    /// Text content, only meaningful for `Body` and `Attribute` nodes.
    pub value: Option<String>,
    pub parent: Option<NodeId>,
    /// Data children, in canonical document order. Never includes
    /// `Attribute` nodes (spec.md invariant: "An attribute is never a data
    /// child").
    pub children: Vec<NodeId>,
    /// Attributes are an ordered set logically distinguished from element
    /// children; only populated for `Element` nodes.
    pub attributes: Vec<NodeId>,
    pub schema_path: Option<Arc<str>>,
    pub flags: NodeFlags,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Node {
            kind,
            name: name.into(),
            prefix: None,
            value: None,
            parent: None,
            children: Vec::new(),
            attributes: Vec::new(),
            schema_path: None,
            flags: NodeFlags::empty(),
        }
    }

    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    pub fn is_attribute(&self) -> bool {
        self.kind == NodeKind::Attribute
    }

    pub fn qname(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.name),
            None => self.name.clone(),
        }
    }
}
