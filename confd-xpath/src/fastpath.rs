//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The list-key fast path (spec.md §4.C), ported from the match conditions
//! in `clixon_xpath_optimize.c`'s `xpath_list_optimize_fn`/`loop_preds`: a
//! compiled tree matching `name[key1='v1'][key2='v2']…` against a list or
//! leaf-list child of the context node dispatches straight to `find_index`
//! instead of the generic O(n) walk.

use confd_tree::{NodeId, Tree};
use confd_yang::YangIndex;
use yang3::schema::SchemaNodeKind;

use crate::ast::{Axis, Location, NodeTest, Predicate, Primary};

pub struct FastPathMatch {
    pub name: String,
    pub key_tuple: Vec<String>,
}

/// Attempts the fast-path match. `loc` must be the *remaining* location (a
/// single step) to evaluate from `context`; callers peel off already-matched
/// leading steps before calling this.
pub fn try_fast_path(loc: &Location, tree: &Tree, context: NodeId, yang: &YangIndex) -> Option<FastPathMatch> {
    if loc.steps.len() != 1 {
        return None;
    }
    let step = &loc.steps[0];
    if step.axis != Axis::Child {
        return None;
    }
    let NodeTest::Name { local, .. } = &step.test else {
        return None;
    };

    let context_node = tree.node(context);
    let context_path = context_node.schema_path.as_ref()?;
    let context_schema = yang.spec_of(context_path).ok()?;

    // 1. context spec is a container/list whose parent is not another list.
    if !matches!(context_schema.kind(), SchemaNodeKind::Container | SchemaNodeKind::List) {
        return None;
    }
    if let Some(parent) = context_schema.ancestors().next() {
        if parent.kind() == SchemaNodeKind::List {
            return None;
        }
    }

    // 2. context is configuration data.
    if !yang.is_config(&context_schema) {
        return None;
    }

    // 3. the step's node-test is a list or leaf-list child of the context.
    let child_schema = context_schema.children().find(|c| c.name() == local.as_str())?;
    if !confd_yang::is_list_like(&child_schema) {
        return None;
    }
    let is_leaf_list = child_schema.kind() == SchemaNodeKind::LeafList;

    // 4. every predicate is an equality whose left side names a key leaf
    //    (or, for a leaf-list, the self axis) and whose right side is a
    //    literal.
    let mut pairs: Vec<(String, String)> = Vec::with_capacity(step.predicates.len());
    for predicate in &step.predicates {
        let Predicate::Eq(lhs, rhs) = predicate else {
            return None;
        };
        let key_name = key_name_of(lhs, is_leaf_list)?;
        let value = literal_of(rhs)?;
        pairs.push((key_name, value));
    }

    // 5. the multiset of predicate key-names equals the declared key set.
    let declared: Vec<String> = if is_leaf_list {
        vec![".".to_string()]
    } else {
        yang.key_names(&child_schema).into_iter().collect()
    };
    if declared.len() != pairs.len() {
        return None;
    }
    let mut ordered = Vec::with_capacity(declared.len());
    for key in &declared {
        let value = pairs.iter().find(|(k, _)| k == key)?.1.clone();
        ordered.push(value);
    }

    Some(FastPathMatch { name: local.clone(), key_tuple: ordered })
}

fn key_name_of(primary: &Primary, is_leaf_list: bool) -> Option<String> {
    let Primary::Path(loc) = primary else { return None };
    if loc.steps.len() != 1 {
        return None;
    }
    let step = &loc.steps[0];
    match (&step.axis, &step.test, is_leaf_list) {
        (Axis::SelfAxis, _, true) => Some(".".to_string()),
        (Axis::Child, NodeTest::Name { local, .. }, false) => Some(local.clone()),
        _ => None,
    }
}

fn literal_of(primary: &Primary) -> Option<String> {
    match primary {
        Primary::StringLit(s) => Some(s.clone()),
        Primary::NumberLit(n) => Some(format_number(*n)),
        _ => None,
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
