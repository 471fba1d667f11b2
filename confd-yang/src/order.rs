//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use std::cmp::Ordering;

use confd_tree::{NodeId, SiblingOrder, Tree};
use yang3::schema::SchemaPathFormat;

use crate::index::YangIndex;

/// The schema-aware [`SiblingOrder`] confd-tree needs to enforce the
/// sorted-child invariant (spec.md §3): containers/leaves sort by schema
/// declaration order, list and leaf-list entries sort by key-tuple/value
/// lexical order within their shared qname slot.
///
/// Nodes lacking a `schema_path` (unbound generic XML) sort after every
/// bound node, by qname.
pub struct YangOrder<'a> {
    pub index: &'a YangIndex,
}

impl YangOrder<'_> {
    fn schema_position(&self, data_path: &str) -> Option<usize> {
        let node = self.index.context().find_path(data_path).ok()?;
        let parent = node.ancestors().next()?;
        parent
            .children()
            .position(|sib| sib.path(SchemaPathFormat::DATA) == data_path)
    }

    fn key_tuple_of(&self, tree: &Tree, node: NodeId, key_names: &[String]) -> Vec<String> {
        key_names
            .iter()
            .map(|key| {
                tree.find_child_by_name(node, key)
                    .and_then(|k| tree.children(k).first().copied())
                    .and_then(|body| tree.node(body).value.clone())
                    .unwrap_or_default()
            })
            .collect()
    }
}

impl SiblingOrder for YangOrder<'_> {
    fn compare(&self, tree: &Tree, a: NodeId, b: NodeId) -> Ordering {
        let na = tree.node(a);
        let nb = tree.node(b);

        match (&na.schema_path, &nb.schema_path) {
            (Some(pa), Some(pb)) => {
                if na.qname() == nb.qname() {
                    if let Ok(schema) = self.index.spec_of(pa) {
                        if crate::index::is_list_like(&schema) {
                            let keys = self.index.key_names(&schema);
                            let ka = self.key_tuple_of(tree, a, &keys);
                            let kb = self.key_tuple_of(tree, b, &keys);
                            return ka.cmp(&kb);
                        }
                    }
                    return na.value.as_deref().unwrap_or("").cmp(nb.value.as_deref().unwrap_or(""));
                }

                match (self.schema_position(pa), self.schema_position(pb)) {
                    (Some(ia), Some(ib)) => ia.cmp(&ib),
                    _ => na.qname().cmp(&nb.qname()),
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => na.qname().cmp(&nb.qname()),
        }
    }

    fn compare_key(&self, tree: &Tree, candidate: NodeId, name: &str, key_tuple: &[String]) -> Ordering {
        let node = tree.node(candidate);
        let qname_order = node.qname().as_str().cmp(name);
        if qname_order != Ordering::Equal {
            return qname_order;
        }

        let keys = match &node.schema_path {
            Some(path) => self
                .index
                .spec_of(path)
                .ok()
                .map(|schema| self.index.key_names(&schema))
                .unwrap_or_default(),
            None => Default::default(),
        };

        if keys.is_empty() {
            let value = node.value.as_deref().unwrap_or("");
            let want = key_tuple.first().map(String::as_str).unwrap_or("");
            return value.cmp(want);
        }

        let candidate_tuple = self.key_tuple_of(tree, candidate, &keys);
        candidate_tuple.as_slice().cmp(key_tuple)
    }
}
