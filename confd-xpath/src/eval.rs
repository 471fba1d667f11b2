//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::Arc;

use confd_mount::MountRegistry;
use confd_tree::{find_index, Node, NodeId, NodeKind, Tree};
use confd_yang::{YangIndex, YangOrder};

use crate::ast::{Axis, Location, NodeTest, Predicate, Primary, Step};
use crate::compile::Compiled;
use crate::error::Error;
use crate::fastpath::try_fast_path;

/// Evaluates a compiled expression from `context`, trying the list-key fast
/// path (spec.md §4.C) at every step before falling back to the generic
/// O(n) walk. Synchronous and non-blocking: never touches a lock. Every
/// schema lookup resolves against `yang` — use [`evaluate_with_mounts`] when
/// the tree may contain schema-mounted subtrees.
pub fn evaluate(compiled: &Compiled, tree: &Tree, context: NodeId, yang: &YangIndex) -> Result<Vec<NodeId>, Error> {
    eval_location(&compiled.location, tree, context, yang, None)
}

/// Same as [`evaluate`], but resolves every step's schema lookups against
/// whichever spec is attached nearest the step's own context node in
/// `mounts`, falling back to `yang` above and outside every mount point
/// (spec.md §4.F: "the evaluator... MUST use this for every spec lookup
/// beneath a mount").
pub fn evaluate_with_mounts(
    compiled: &Compiled,
    tree: &Tree,
    context: NodeId,
    yang: &YangIndex,
    mounts: &MountRegistry,
) -> Result<Vec<NodeId>, Error> {
    eval_location(&compiled.location, tree, context, yang, Some(mounts))
}

/// The spec governing a given context node: the spec attached at the
/// nearest mount-point ancestor (inclusive), or `yang` if none applies.
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

/// A mount point's own data node keeps its globally-resolved `schema_path`
/// (only its children get rebased onto the mounted spec), so walking `ctx`'s
/// ancestors inclusive and testing each one's path against the registry
/// finds the nearest mount boundary without needing the rebased paths below
/// it to carry any outer prefix.
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

fn eval_location(
    loc: &Location,
    tree: &Tree,
    start: NodeId,
    yang: &YangIndex,
    mounts: Option<&MountRegistry>,
) -> Result<Vec<NodeId>, Error> {
    let mut contexts = if loc.absolute {
        tree.root().into_iter().collect::<Vec<_>>()
    } else {
        vec![start]
    };

    for step in &loc.steps {
        let mut next = Vec::new();
        let single = Location { absolute: false, steps: vec![step.clone()] };

        for &ctx in &contexts {
            let spec = spec_for(tree, ctx, yang, mounts);
            let ctx_yang = spec.index();
            let order = YangOrder { index: ctx_yang };

            if let Some(fast) = try_fast_path(&single, tree, ctx, ctx_yang) {
                if let Some(found) = find_index(tree, ctx, &fast.name, &fast.key_tuple, &order) {
                    next.push(found);
                }
                continue;
            }
            next.extend(eval_step(step, tree, ctx, yang, mounts)?);
        }
        contexts = next;
    }
    Ok(contexts)
}

fn eval_step(
    step: &Step,
    tree: &Tree,
    ctx: NodeId,
    yang: &YangIndex,
    mounts: Option<&MountRegistry>,
) -> Result<Vec<NodeId>, Error> {
    let mut candidates: Vec<NodeId> = match step.axis {
        Axis::Child => tree
            .children(ctx)
            .iter()
            .copied()
            .filter(|&c| node_test_matches(&step.test, tree.node(c)))
            .collect(),
        Axis::SelfAxis => vec![ctx],
        Axis::Parent => tree.parent(ctx).into_iter().collect(),
        Axis::DescendantOrSelf => tree
            .traverse(ctx)
            .filter(|&n| node_test_matches(&step.test, tree.node(n)))
            .collect(),
    };

    for predicate in &step.predicates {
        candidates = apply_predicate(predicate, tree, &candidates, yang, mounts)?;
    }
    Ok(candidates)
}

fn node_test_matches(test: &NodeTest, node: &Node) -> bool {
    if !node.is_element() {
        return false;
    }
    match test {
        NodeTest::Wildcard => true,
        NodeTest::Name { prefix, local } => {
            node.name == *local && (prefix.is_none() || node.prefix.as_deref() == prefix.as_deref())
        }
    }
}

fn apply_predicate(
    predicate: &Predicate,
    tree: &Tree,
    candidates: &[NodeId],
    yang: &YangIndex,
    mounts: Option<&MountRegistry>,
) -> Result<Vec<NodeId>, Error> {
    match predicate {
        Predicate::Index(i) => Ok(candidates.get(i.saturating_sub(1)).copied().into_iter().collect()),
        Predicate::Eq(lhs, rhs) => {
            let mut out = Vec::new();
            for &c in candidates {
                let lv = eval_primary_text(lhs, tree, c, yang, mounts)?;
                let rv = eval_primary_text(rhs, tree, c, yang, mounts)?;
                if lv.iter().any(|l| rv.contains(l)) {
                    out.push(c);
                }
            }
            Ok(out)
        }
        Predicate::Existence(loc) => {
            let mut out = Vec::new();
            for &c in candidates {
                if !eval_location(loc, tree, c, yang, mounts)?.is_empty() {
                    out.push(c);
                }
            }
            Ok(out)
        }
    }
}

fn eval_primary_text(
    primary: &Primary,
    tree: &Tree,
    ctx: NodeId,
    yang: &YangIndex,
    mounts: Option<&MountRegistry>,
) -> Result<Vec<String>, Error> {
    match primary {
        Primary::StringLit(s) => Ok(vec![s.clone()]),
        Primary::NumberLit(n) => Ok(vec![format_number(*n)]),
        Primary::Path(loc) => Ok(eval_location(loc, tree, ctx, yang, mounts)?
            .into_iter()
            .map(|n| node_text(tree, n))
            .collect()),
        Primary::FuncCall(name, args) if name == "current" && args.is_empty() => Ok(vec![node_text(tree, ctx)]),
        Primary::FuncCall(name, _) => Err(Error::UnsupportedFunction(name.clone())),
    }
}

fn node_text(tree: &Tree, node: NodeId) -> String {
    tree.children(node)
        .iter()
        .find(|&&c| tree.node(c).kind == NodeKind::Body)
        .map(|&body| tree.node(body).value.clone().unwrap_or_default())
        .unwrap_or_else(|| tree.node(node).value.clone().unwrap_or_default())
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use confd_tree::Tree;
    use yang3::context::{Context, ContextFlags};

    use super::*;
    use crate::compile::compile;

    fn empty_yang() -> YangIndex {
        YangIndex::new(Context::new(ContextFlags::empty()).expect("empty context"))
    }

    fn sample_tree() -> (Tree, NodeId) {
        let mut tree = Tree::new();
        let root = tree.new_node(NodeKind::Element, "config", None);
        let interfaces = tree.new_node(NodeKind::Element, "interfaces", Some(root));
        for name in ["eth0", "eth1"] {
            let iface = tree.new_node(NodeKind::Element, "interface", Some(interfaces));
            let name_leaf = tree.new_node(NodeKind::Element, "name", Some(iface));
            let body = tree.new_node(NodeKind::Body, "", Some(name_leaf));
            tree.node_mut(body).value = Some(name.to_string());
        }
        (tree, root)
    }

    #[test]
    fn generic_child_and_eq_predicate() {
        let (tree, root) = sample_tree();
        let yang = empty_yang();
        let compiled = compile("interfaces/interface[name='eth1']").unwrap();
        let result = evaluate(&compiled, &tree, root, &yang).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(node_text(&tree, tree.find_child_by_name(result[0], "name").unwrap()), "eth1");
    }

    #[test]
    fn index_predicate_selects_nth_match() {
        let (tree, root) = sample_tree();
        let yang = empty_yang();
        let compiled = compile("interfaces/interface[2]").unwrap();
        let result = evaluate(&compiled, &tree, root, &yang).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(node_text(&tree, tree.find_child_by_name(result[0], "name").unwrap()), "eth1");
    }

    #[test]
    fn absolute_path_ignores_start_context() {
        let (tree, root) = sample_tree();
        let interfaces = tree.find_child_by_name(root, "interfaces").unwrap();
        let yang = empty_yang();
        let compiled = compile("/interfaces").unwrap();
        let result = evaluate(&compiled, &tree, interfaces, &yang).unwrap();
        assert_eq!(result, vec![interfaces]);
    }

    const MOUNTED_MODULE: &str = r#"
module confd-mounted {
  yang-version 1.1;
  namespace "urn:confd:mounted";
  prefix cm;

  list item {
    key "name";
    leaf name {
      type string;
    }
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

    fn bind_stub_mount(dir: &std::path::Path, tree: &Tree, node: NodeId, mount_path: &str) -> MountRegistry {
        std::fs::write(dir.join("confd-mounted.yang"), MOUNTED_MODULE).unwrap();
        let registry = MountRegistry::new();
        registry
            .bind(tree, node, std::sync::Arc::from(mount_path), &StubCallback, &StubLoader(dir.to_path_buf()))
            .unwrap()
            .expect("stub loader always resolves");
        registry
    }

    #[test]
    fn spec_for_resolves_nearest_mount_point_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let outer_yang = empty_yang();

        let mut tree = Tree::new();
        let root = tree.new_node(NodeKind::Element, "config", None);
        let mount_point = tree.new_node(NodeKind::Element, "mount-point", Some(root));
        tree.node_mut(mount_point).schema_path = Some("/confd-host:mount-point".into());
        let item = tree.new_node(NodeKind::Element, "item", Some(mount_point));

        let registry = bind_stub_mount(dir.path(), &tree, mount_point, "/confd-host:mount-point");

        // Outside the mount, there's nothing to resolve against but the
        // global (here, empty) index.
        assert!(matches!(spec_for(&tree, root, &outer_yang, Some(&registry)), Spec::Global(_)));

        // Below the mount point, the mounted spec applies and knows about a
        // list the global index was never told about.
        let spec = spec_for(&tree, item, &outer_yang, Some(&registry));
        assert!(spec.index().context().find_path("/confd-mounted:item").is_some());

        // With no registry at all, everything falls back to the global index.
        assert!(matches!(spec_for(&tree, item, &outer_yang, None), Spec::Global(_)));
    }

    #[test]
    fn evaluate_with_mounts_finds_entries_under_a_mounted_list() {
        let dir = tempfile::tempdir().unwrap();
        let outer_yang = empty_yang();

        let mut tree = Tree::new();
        let root = tree.new_node(NodeKind::Element, "config", None);
        let mount_point = tree.new_node(NodeKind::Element, "mount-point", Some(root));
        tree.node_mut(mount_point).schema_path = Some("/confd-host:mount-point".into());
        let item = tree.new_node(NodeKind::Element, "item", Some(mount_point));
        let name_leaf = tree.new_node(NodeKind::Element, "name", Some(item));
        let body = tree.new_node(NodeKind::Body, "", Some(name_leaf));
        tree.node_mut(body).value = Some("a".to_string());

        let registry = bind_stub_mount(dir.path(), &tree, mount_point, "/confd-host:mount-point");

        let compiled = compile("item[name='a']").unwrap();
        let result = evaluate_with_mounts(&compiled, &tree, mount_point, &outer_yang, &registry).unwrap();
        assert_eq!(result, vec![item]);
    }
}
