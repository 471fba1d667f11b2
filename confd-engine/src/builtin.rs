//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The built-in constraint checks `validate()` runs over the target tree
//! before any application `ValidationCallback` sees it (spec.md §4.E:
//! "built-in checks: YANG type constraints, mandatory, when/must, unique,
//! min-elements/max-elements, leafref targets"), ported from the walks
//! `clixon_yang_type.c` (`original_source/`) does over `cligen`'s compiled
//! type cache.
//!
//! Two of the six named checks aren't implementable against this workspace's
//! `yang3` binding: `when`/`must` (`SchemaStmtWhen`/`SchemaStmtMust` expose
//! only `description`/`reference`/`error_msg`, never the XPath condition
//! itself) and `unique` (`SchemaNode` has no `uniques()` accessor). Both are
//! confirmed absent by reading the binding's own struct definitions rather
//! than assumed; see DESIGN.md. Leafref target *existence* is in the same
//! position — there's no accessor for a leafref's `path` substatement, only
//! `leafref_real_type`'s already-resolved base type — so leafref is enforced
//! at the type level (the value must parse as the referenced base type),
//! not by resolving the referenced instance.

use std::sync::Arc;

use confd_mount::MountRegistry;
use confd_tree::{NodeId, Tree};
use confd_yang::{BaseType, YangIndex};
use yang3::schema::{SchemaNode, SchemaNodeKind};

use crate::debug::Debug;

/// Runs every built-in check over `root`'s subtree, appending a message per
/// violation to `failures` rather than stopping at the first one, matching
/// `validate()`'s own "report every violation at once" contract. `mounts`,
/// when given, is consulted for every node so a subtree beneath a mount
/// point is checked against its attached spec rather than `yang` (spec.md
/// §4.F: "the... validator MUST use this for every spec lookup beneath a
/// mount").
pub fn check(tree: &Tree, root: NodeId, yang: &YangIndex, mounts: Option<&MountRegistry>, failures: &mut Vec<String>) {
    Debug::BuiltinValidation(&tree.node(root).name).log();

    check_children(tree, root, top_level_schema_nodes(yang), yang, failures);

    for node in tree.traverse(root) {
        let Some(path) = tree.node(node).schema_path.clone() else { continue };

        // A bound mount point's own node still declares itself in the host
        // schema, but its children belong to the mounted module set's own
        // top level, not to any child the host schema names (spec.md §4.F).
        if let Some(mounts) = mounts {
            if let Ok(host_schema) = yang.spec_of(&path) {
                if yang.is_mount_point_candidate(&host_schema) {
                    if let Some(mounted) = mounts.mount_spec_for(&path) {
                        check_children(tree, node, top_level_schema_nodes(&mounted), &mounted, failures);
                        continue;
                    }
                }
            }
        }

        let spec = spec_for(tree, node, yang, mounts);
        let node_yang = spec.index();
        let Ok(schema) = node_yang.spec_of(&path) else { continue };

        match schema.kind() {
            SchemaNodeKind::Container | SchemaNodeKind::List => {
                check_children(tree, node, schema.children(), node_yang, failures);
            }
            SchemaNodeKind::Leaf | SchemaNodeKind::LeafList => {
                check_leaf_type(tree, node, &schema, node_yang, failures);
            }
            _ => {}
        }
    }
}

fn top_level_schema_nodes(yang: &YangIndex) -> impl Iterator<Item = SchemaNode<'_>> {
    yang.context().modules(true).flat_map(|module| module.data())
}

/// The spec governing a given tree node: the spec attached at the nearest
/// mount-point ancestor (inclusive) if `mounts` has one, else `yang`. A
/// mount point's own node keeps its globally-resolved `schema_path` (only
/// its children are rebased onto the mounted spec), so walking ancestors
/// inclusive and testing each one's own path against the registry finds the
/// boundary correctly.
enum Spec<'a> {
    Global(&'a YangIndex),
    Mounted(Arc<YangIndex>),
}

impl Spec<'_> {
    fn index(&self) -> &YangIndex {
        match self {
            Spec::Global(y) => y,
            Spec::Mounted(y) => y,
        }
    }
}

fn spec_for<'a>(tree: &Tree, ctx: NodeId, yang: &'a YangIndex, mounts: Option<&MountRegistry>) -> Spec<'a> {
    if let Some(mounts) = mounts {
        for ancestor in tree.ancestors(ctx) {
            let Some(path) = tree.node(ancestor).schema_path.as_ref() else { continue };
            if let Some(mounted) = mounts.mount_spec_for(path) {
                return Spec::Mounted(mounted);
            }
        }
    }
    Spec::Global(yang)
}

/// Enforces `mandatory` and `min-elements`/`max-elements` for every
/// `schema_children` declared under `parent`, by counting `parent`'s actual
/// tree children with that schema node's name.
fn check_children<'a>(
    tree: &Tree,
    parent: NodeId,
    schema_children: impl Iterator<Item = SchemaNode<'a>>,
    yang: &YangIndex,
    failures: &mut Vec<String>,
) {
    let parent_name = tree.node(parent).name.clone();
    for child_schema in schema_children {
        if !yang.is_config(&child_schema) {
            continue;
        }
        let name = child_schema.name();
        let count = tree
            .children(parent)
            .iter()
            .filter(|&&c| tree.node(c).name == name)
            .count();

        if count == 0 && child_schema.is_mandatory() {
            failures.push(format!("mandatory node '{name}' missing under '{parent_name}'"));
        }

        if confd_yang::is_list_like(&child_schema) {
            if let Some(min) = child_schema.min_elements() {
                if (count as u32) < min {
                    failures.push(format!(
                        "list '{name}' under '{parent_name}' has {count} entries, requires at least {min}"
                    ));
                }
            }
            if let Some(max) = child_schema.max_elements() {
                if (count as u32) > max {
                    failures.push(format!(
                        "list '{name}' under '{parent_name}' has {count} entries, exceeds maximum {max}"
                    ));
                }
            }
        }
    }
}

fn check_leaf_type(tree: &Tree, node: NodeId, schema: &SchemaNode<'_>, yang: &YangIndex, failures: &mut Vec<String>) {
    let Some(value) = leaf_text(tree, node) else { return };
    let Ok(resolved) = yang.resolve_type(schema) else { return };

    let name = &tree.node(node).name;
    let problem = match resolved.base {
        BaseType::Int => value.parse::<i64>().is_err().then_some("is not a valid integer"),
        BaseType::Uint => value.parse::<u64>().is_err().then_some("is not a valid unsigned integer"),
        BaseType::Decimal64 => value.parse::<f64>().is_err().then_some("is not a valid decimal"),
        BaseType::Bool => (value != "true" && value != "false").then_some("is not a valid boolean"),
        BaseType::String | BaseType::Enumeration | BaseType::Binary | BaseType::Leafref | BaseType::Other => None,
    };
    if let Some(problem) = problem {
        failures.push(format!("value '{value}' at '{name}' {problem}"));
    }
}

fn leaf_text(tree: &Tree, node: NodeId) -> Option<String> {
    tree.children(node)
        .iter()
        .find(|&&c| tree.node(c).kind == confd_tree::NodeKind::Body)
        .and_then(|&b| tree.node(b).value.clone())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use confd_tree::NodeKind;
    use yang3::context::{Context, ContextFlags};
    use yang3::schema::SchemaPathFormat;

    use super::*;

    const MODULE: &str = r#"
module confd-test {
  yang-version 1.1;
  namespace "urn:confd:test";
  prefix ct;

  container system {
    leaf hostname {
      type string;
      mandatory true;
    }
    leaf retries {
      type uint8;
    }
    list user {
      key "name";
      min-elements 1;
      max-elements 2;
      leaf name {
        type string;
      }
    }
  }
}
"#;

    fn loaded_yang() -> YangIndex {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("confd-test.yang")).unwrap();
        file.write_all(MODULE.as_bytes()).unwrap();
        drop(file);

        let mut ctx = Context::new(ContextFlags::empty()).unwrap();
        ctx.set_searchdir(dir.path()).unwrap();
        ctx.load_module("confd-test", None, &[]).unwrap();
        YangIndex::new(ctx)
    }

    fn bind(tree: &mut Tree, node: NodeId, yang: &YangIndex, path: &str) {
        let schema = yang.spec_of(path).unwrap();
        tree.node_mut(node).schema_path = Some(schema.path(SchemaPathFormat::DATA).into());
    }

    #[test]
    fn flags_missing_mandatory_leaf_and_short_list() {
        let yang = loaded_yang();

        let mut tree = Tree::new();
        let root = tree.new_node(NodeKind::Element, "config", None);
        let system = tree.new_node(NodeKind::Element, "system", Some(root));
        bind(&mut tree, system, &yang, "/confd-test:system");
        // hostname omitted: mandatory violation.
        // user list omitted: min-elements violation.

        let mut failures = Vec::new();
        check(&tree, root, &yang, None, &mut failures);

        assert!(failures.iter().any(|f| f.contains("mandatory node 'hostname'")));
        assert!(failures.iter().any(|f| f.contains("list 'user'") && f.contains("requires at least 1")));
    }

    #[test]
    fn flags_too_many_list_entries_and_bad_scalar_value() {
        let yang = loaded_yang();

        let mut tree = Tree::new();
        let root = tree.new_node(NodeKind::Element, "config", None);
        let system = tree.new_node(NodeKind::Element, "system", Some(root));
        bind(&mut tree, system, &yang, "/confd-test:system");

        let hostname = tree.new_node(NodeKind::Element, "hostname", Some(system));
        bind(&mut tree, hostname, &yang, "/confd-test:system/hostname");
        let body = tree.new_node(NodeKind::Body, "", Some(hostname));
        tree.node_mut(body).value = Some("router1".to_string());

        let retries = tree.new_node(NodeKind::Element, "retries", Some(system));
        bind(&mut tree, retries, &yang, "/confd-test:system/retries");
        let body = tree.new_node(NodeKind::Body, "", Some(retries));
        tree.node_mut(body).value = Some("not-a-number".to_string());

        for name in ["alice", "bob", "carol"] {
            let user = tree.new_node(NodeKind::Element, "user", Some(system));
            bind(&mut tree, user, &yang, "/confd-test:system/user");
            let key = tree.new_node(NodeKind::Element, "name", Some(user));
            bind(&mut tree, key, &yang, "/confd-test:system/user/name");
            let body = tree.new_node(NodeKind::Body, "", Some(key));
            tree.node_mut(body).value = Some(name.to_string());
        }

        let mut failures = Vec::new();
        check(&tree, root, &yang, None, &mut failures);

        assert!(failures.iter().any(|f| f.contains("exceeds maximum 2")));
        assert!(failures.iter().any(|f| f.contains("'not-a-number' at 'retries'")));
        assert!(!failures.iter().any(|f| f.contains("mandatory node 'hostname'")));
    }

    #[test]
    fn unbound_tree_without_schema_paths_reports_nothing() {
        let yang = loaded_yang();

        let mut tree = Tree::new();
        let root = tree.new_node(NodeKind::Element, "config", None);
        tree.new_node(NodeKind::Element, "system", Some(root));

        let mut failures = Vec::new();
        check(&tree, root, &yang, None, &mut failures);
        assert!(failures.is_empty());
    }

    const MOUNTED_MODULE: &str = r#"
module confd-mounted {
  yang-version 1.1;
  namespace "urn:confd:mounted";
  prefix cm;

  leaf counter {
    type uint8;
    mandatory true;
  }
}
"#;

    struct StubCallback;
    impl confd_mount::MountCallback for StubCallback {
        fn yang_lib_for(&self, _tree: &Tree, _node: NodeId, _mount_path: &str) -> Option<confd_mount::YangLibrary> {
            Some(confd_mount::YangLibrary { modules: vec![] })
        }
    }

    struct StubLoader(std::path::PathBuf);
    impl confd_mount::MountLoader for StubLoader {
        fn load(&self, _yanglib: &confd_mount::YangLibrary) -> Result<yang3::context::Context, confd_mount::Error> {
            let mut ctx = Context::new(ContextFlags::empty()).unwrap();
            ctx.set_searchdir(&self.0).unwrap();
            ctx.load_module("confd-mounted", None, &[]).unwrap();
            Ok(ctx)
        }
    }

    /// The mounted spec declares `counter` as mandatory; the host spec has
    /// no idea "mount-point" has any children at all. A check that ignored
    /// `mounts` entirely would report nothing here, same as an unbound tree.
    #[test]
    fn flags_mandatory_violation_beneath_a_mount_point() {
        let yang = loaded_yang();

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("confd-mounted.yang"), MOUNTED_MODULE).unwrap();

        let mut tree = Tree::new();
        let root = tree.new_node(NodeKind::Element, "config", None);
        let system = tree.new_node(NodeKind::Element, "system", Some(root));
        bind(&mut tree, system, &yang, "/confd-test:system");
        let mount_point = tree.new_node(NodeKind::Element, "user", Some(system));
        bind(&mut tree, mount_point, &yang, "/confd-test:system/user");
        let key = tree.new_node(NodeKind::Element, "name", Some(mount_point));
        bind(&mut tree, key, &yang, "/confd-test:system/user/name");
        let body = tree.new_node(NodeKind::Body, "", Some(key));
        tree.node_mut(body).value = Some("alice".to_string());

        let registry = MountRegistry::new();
        let mount_path: std::sync::Arc<str> = tree.node(mount_point).schema_path.clone().unwrap();
        registry
            .bind(&tree, mount_point, mount_path, &StubCallback, &StubLoader(dir.path().to_path_buf()))
            .unwrap()
            .expect("stub loader always resolves");

        let mut failures = Vec::new();
        check(&tree, root, &yang, Some(&registry), &mut failures);

        assert!(failures.iter().any(|f| f.contains("mandatory node 'counter'")));
    }
}
