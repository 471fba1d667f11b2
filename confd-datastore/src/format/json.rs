//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use confd_tree::{NodeId, NodeKind, Tree};
use serde_json::{Map, Value};

use crate::error::Error;

/// Encodes `node`'s children as a JSON object, one field per distinct
/// qname. Children sharing a qname (list/leaf-list entries) are grouped
/// into a JSON array — `XMLDB_FORMAT=json` round-trips through the same
/// qname-based structure `clixon_json.c` builds from the sorted-child tree.
pub fn encode(tree: &Tree, node: NodeId) -> Value {
    let mut grouped: Map<String, Value> = Map::new();
    let mut order: Vec<String> = Vec::new();

    for &child in tree.children(node) {
        let child_node = tree.node(child);
        let qname = child_node.qname();
        let value = encode_value(tree, child);

        match grouped.get_mut(&qname) {
            Some(Value::Array(arr)) => arr.push(value),
            Some(existing) => {
                let first = existing.clone();
                grouped.insert(qname.clone(), Value::Array(vec![first, value]));
            }
            None => {
                order.push(qname.clone());
                grouped.insert(qname, value);
            }
        }
    }

    let mut obj = Map::new();
    for qname in order {
        if let Some(v) = grouped.remove(&qname) {
            obj.insert(qname, v);
        }
    }
    Value::Object(obj)
}

fn encode_value(tree: &Tree, node: NodeId) -> Value {
    let has_element_children = tree.children(node).iter().any(|&c| tree.node(c).is_element());
    if has_element_children {
        encode(tree, node)
    } else {
        match tree
            .children(node)
            .iter()
            .find(|&&c| tree.node(c).kind == NodeKind::Body)
            .and_then(|&body| tree.node(body).value.clone())
        {
            Some(text) => Value::String(text),
            None => Value::Null,
        }
    }
}

/// Decodes a JSON object (as produced by [`encode`]) into fresh children of
/// `parent` within `tree`.
pub fn decode(tree: &mut Tree, parent: NodeId, value: &Value) -> Result<(), Error> {
    let Value::Object(obj) = value else {
        return Err(Error::Parse("expected a JSON object at datastore root".to_string()));
    };
    for (qname, v) in obj {
        let (prefix, name) = split_qname(qname);
        match v {
            Value::Array(items) => {
                for item in items {
                    let child = tree.new_node(NodeKind::Element, name.clone(), Some(parent));
                    tree.node_mut(child).prefix = prefix.clone();
                    decode_child_value(tree, child, item)?;
                }
            }
            other => {
                let child = tree.new_node(NodeKind::Element, name, Some(parent));
                tree.node_mut(child).prefix = prefix;
                decode_child_value(tree, child, other)?;
            }
        }
    }
    Ok(())
}

fn decode_child_value(tree: &mut Tree, child: NodeId, value: &Value) -> Result<(), Error> {
    match value {
        Value::Object(_) => decode(tree, child, value),
        Value::String(s) => {
            let body = tree.new_node(NodeKind::Body, "", Some(child));
            tree.node_mut(body).value = Some(s.clone());
            Ok(())
        }
        Value::Number(n) => {
            let body = tree.new_node(NodeKind::Body, "", Some(child));
            tree.node_mut(body).value = Some(n.to_string());
            Ok(())
        }
        Value::Bool(b) => {
            let body = tree.new_node(NodeKind::Body, "", Some(child));
            tree.node_mut(body).value = Some(b.to_string());
            Ok(())
        }
        Value::Null => Ok(()),
        Value::Array(_) => Err(Error::Parse("unexpected nested array".to_string())),
    }
}

fn split_qname(qname: &str) -> (Option<String>, String) {
    match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
        None => (None, qname.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use confd_tree::Tree;

    use super::*;

    #[test]
    fn round_trips_container_and_list() {
        let mut tree = Tree::new();
        let root = tree.new_node(NodeKind::Element, "config", None);
        let interfaces = tree.new_node(NodeKind::Element, "interfaces", Some(root));
        for name in ["eth0", "eth1"] {
            let iface = tree.new_node(NodeKind::Element, "interface", Some(interfaces));
            let leaf = tree.new_node(NodeKind::Element, "name", Some(iface));
            let body = tree.new_node(NodeKind::Body, "", Some(leaf));
            tree.node_mut(body).value = Some(name.to_string());
        }

        let encoded = encode(&tree, root);

        let mut decoded = Tree::new();
        let decoded_root = decoded.new_node(NodeKind::Element, "config", None);
        decode(&mut decoded, decoded_root, &encoded).unwrap();

        let decoded_interfaces = decoded.find_child_by_name(decoded_root, "interfaces").unwrap();
        assert_eq!(decoded.children(decoded_interfaces).len(), 2);
    }
}
