//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use std::io::Write;

use confd_tree::{NodeId, NodeKind, Tree};
use xml::reader::XmlEvent as ReadEvent;
use xml::writer::XmlEvent as WriteEvent;
use xml::{EmitterConfig, ParserConfig};

use crate::error::Error;

/// Writes `node`'s subtree as an XML fragment (spec.md §4.D, `XMLDB_FORMAT=xml`).
pub fn encode<W: Write>(writer: W, tree: &Tree, node: NodeId) -> Result<(), Error> {
    let mut xml_writer = EmitterConfig::new().perform_indent(true).create_writer(writer);
    write_element(&mut xml_writer, tree, node)?;
    Ok(())
}

fn write_element<W: Write>(
    writer: &mut xml::writer::EventWriter<W>,
    tree: &Tree,
    node: NodeId,
) -> Result<(), Error> {
    let n = tree.node(node);
    let name = n.qname();
    writer
        .write(WriteEvent::start_element(name.as_str()))
        .map_err(|e| Error::Io(e.to_string()))?;

    for &child in tree.children(node) {
        let child_node = tree.node(child);
        match child_node.kind {
            NodeKind::Body => {
                if let Some(text) = &child_node.value {
                    writer.write(WriteEvent::characters(text)).map_err(|e| Error::Io(e.to_string()))?;
                }
            }
            NodeKind::Element => write_element(writer, tree, child)?,
            NodeKind::Comment | NodeKind::Pi | NodeKind::Attribute => {}
        }
    }

    writer.write(WriteEvent::end_element()).map_err(|e| Error::Io(e.to_string()))?;
    Ok(())
}

/// Parses an XML fragment whose outer element corresponds to `parent`
/// itself (as written by [`encode`]) back into `parent`'s children.
pub fn decode<R: std::io::Read>(reader: R, tree: &mut Tree, parent: NodeId) -> Result<(), Error> {
    let xml_reader = ParserConfig::new().trim_whitespace(true).create_reader(reader);
    let mut stack: Vec<NodeId> = Vec::new();
    let mut seen_root = false;

    for event in xml_reader {
        match event.map_err(|e| Error::Parse(e.to_string()))? {
            ReadEvent::StartElement { name, .. } => {
                if !seen_root {
                    seen_root = true;
                    stack.push(parent);
                    continue;
                }
                let current = *stack.last().unwrap();
                let node = tree.new_node(NodeKind::Element, name.local_name, Some(current));
                if let Some(ns) = name.prefix {
                    tree.node_mut(node).prefix = Some(ns);
                }
                stack.push(node);
            }
            ReadEvent::Characters(text) if !text.trim().is_empty() => {
                let current = *stack.last().unwrap();
                let body = tree.new_node(NodeKind::Body, "", Some(current));
                tree.node_mut(body).value = Some(text);
            }
            ReadEvent::EndElement { .. } => {
                stack.pop();
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_nested_elements() {
        let mut tree = Tree::new();
        let root = tree.new_node(NodeKind::Element, "config", None);
        let iface = tree.new_node(NodeKind::Element, "interface", Some(root));
        let leaf = tree.new_node(NodeKind::Element, "name", Some(iface));
        let body = tree.new_node(NodeKind::Body, "", Some(leaf));
        tree.node_mut(body).value = Some("eth0".to_string());

        let mut buf = Vec::new();
        encode(&mut buf, &tree, root).unwrap();

        let mut decoded = Tree::new();
        let decoded_root = decoded.new_node(NodeKind::Element, "config", None);
        decode(buf.as_slice(), &mut decoded, decoded_root).unwrap();

        let decoded_iface = decoded.find_child_by_name(decoded_root, "interface").unwrap();
        let decoded_name = decoded.find_child_by_name(decoded_iface, "name").unwrap();
        let decoded_body = decoded.children(decoded_name)[0];
        assert_eq!(decoded.node(decoded_body).value.as_deref(), Some("eth0"));
    }
}
