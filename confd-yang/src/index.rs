//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use smallvec::SmallVec;
use yang3::context::Context;
use yang3::schema::{DataValueType, SchemaModule, SchemaNode, SchemaNodeKind};

use crate::error::Error;
use crate::restrict::{BaseType, ResolvedType};

/// Component B: the YANG schema index (spec.md §4.B).
///
/// Wraps a loaded `yang3::context::Context` and exposes the lookups the
/// tree/xpath/datastore/engine crates need, memoising the expensive ones
/// (type resolution) the same way `holo-utils::yang::SchemaNodeExt` caches a
/// node's data path — keyed here on the canonical data path string rather
/// than an unsafe private pointer, since confd-tree nodes already carry that
/// path as their YANG back-reference.
pub struct YangIndex {
    ctx: Context,
    type_cache: RefCell<HashMap<String, Arc<ResolvedType>>>,
    /// Data paths of schema nodes an application has registered as mount
    /// candidates. `yang3` doesn't expose YANG extension introspection, so
    /// `is_mount_point_candidate` is table-driven rather than parsed off the
    /// `mount-point` extension statement directly; `confd-mount` populates
    /// this set at startup from its own configuration (see DESIGN.md).
    mount_candidates: RefCell<HashSet<String>>,
}

impl YangIndex {
    pub fn new(ctx: Context) -> Self {
        YangIndex {
            ctx,
            type_cache: RefCell::new(HashMap::new()),
            mount_candidates: RefCell::new(HashSet::new()),
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn register_mount_candidate(&self, data_path: impl Into<String>) {
        self.mount_candidates.borrow_mut().insert(data_path.into());
    }

    /// `spec_of(node)` — the schema node bound to a canonical data path.
    pub fn spec_of(&self, data_path: &str) -> Result<SchemaNode<'_>, Error> {
        self.ctx
            .find_path(data_path)
            .map_err(|_| Error::SchemaNotFound(data_path.to_string()))
    }

    /// `is_config(stmt)`.
    pub fn is_config(&self, node: &SchemaNode<'_>) -> bool {
        node.is_config()
    }

    /// `is_mount_point_candidate(stmt)`.
    pub fn is_mount_point_candidate(&self, node: &SchemaNode<'_>) -> bool {
        let path = node.path(yang3::schema::SchemaPathFormat::DATA);
        self.mount_candidates.borrow().contains(&path)
    }

    /// `key_names(list_stmt)`.
    pub fn key_names(&self, list_node: &SchemaNode<'_>) -> SmallVec<[String; 4]> {
        list_node.list_keys().map(|k| k.name().to_string()).collect()
    }

    /// `find_datanode(module, local_name)`.
    pub fn find_datanode(&self, module: &str, local_name: &str) -> Result<SchemaNode<'_>, Error> {
        let module = self
            .ctx
            .get_module_latest(module)
            .ok_or_else(|| Error::ModuleNotFound(module.to_string()))?;
        module
            .data()
            .find(|n| n.name() == local_name)
            .ok_or_else(|| Error::SchemaNotFound(local_name.to_string()))
    }

    /// `find_module_by_prefix(ctx, pfx)`.
    pub fn find_module_by_prefix(&self, prefix: &str) -> Result<SchemaModule<'_>, Error> {
        // Prefixes map 1:1 to a module's own declared prefix; libyang has no
        // direct prefix->module API so this walks the implemented module set.
        self.ctx
            .modules(true)
            .find(|m| m.prefix() == prefix)
            .ok_or_else(|| Error::ModuleNotFound(prefix.to_string()))
    }

    /// `find_module_by_namespace_revision(ns, rev)`.
    pub fn find_module_by_namespace_revision(
        &self,
        namespace: &str,
        revision: Option<&str>,
    ) -> Result<SchemaModule<'_>, Error> {
        match revision {
            Some(rev) => self
                .ctx
                .get_module_ns(namespace, Some(rev))
                .ok_or_else(|| Error::ModuleNotFound(namespace.to_string())),
            None => self
                .ctx
                .get_module_latest_ns(namespace)
                .ok_or_else(|| Error::ModuleNotFound(namespace.to_string())),
        }
    }

    /// `resolve_type(stmt) → base_type`.
    ///
    /// Follows a leafref's indirection down to the first non-leafref type via
    /// `SchemaLeafType::leafref_real_type` — the one typedef-chain-following
    /// accessor this binding exposes (`leaf_type()`/`typedef_name()` give the
    /// immediate type only). See [`ResolvedType`] for why range/length/
    /// pattern/fraction-digits restrictions stop here rather than being
    /// merged into the result.
    pub fn resolve_type(&self, node: &SchemaNode<'_>) -> Result<Arc<ResolvedType>, Error> {
        let data_path = node.path(yang3::schema::SchemaPathFormat::DATA);
        if let Some(cached) = self.type_cache.borrow().get(&data_path) {
            return Ok(cached.clone());
        }

        let leaf_type = node
            .leaf_type()
            .ok_or_else(|| Error::NotALeaf(data_path.clone()))?;
        let base = resolve_leafref_base(leaf_type);

        let resolved = Arc::new(ResolvedType { base });
        self.type_cache.borrow_mut().insert(data_path, resolved.clone());
        Ok(resolved)
    }
}

fn resolve_leafref_base(leaf_type: yang3::schema::SchemaLeafType<'_>) -> BaseType {
    let base = map_base_type(leaf_type.base_type());
    if base == BaseType::Leafref {
        if let Some(real) = leaf_type.leafref_real_type() {
            return resolve_leafref_base(real);
        }
    }
    base
}

fn map_base_type(value: DataValueType) -> BaseType {
    match value {
        DataValueType::String | DataValueType::Bits | DataValueType::InstanceId => {
            BaseType::String
        }
        DataValueType::Uint8 | DataValueType::Uint16 | DataValueType::Uint32 | DataValueType::Uint64 => {
            BaseType::Uint
        }
        DataValueType::Int8 | DataValueType::Int16 | DataValueType::Int32 | DataValueType::Int64 => {
            BaseType::Int
        }
        DataValueType::Dec64 => BaseType::Decimal64,
        DataValueType::Bool | DataValueType::Empty => BaseType::Bool,
        DataValueType::Enum | DataValueType::IdentityRef => BaseType::Enumeration,
        DataValueType::Binary => BaseType::Binary,
        DataValueType::LeafRef => BaseType::Leafref,
        DataValueType::Union | DataValueType::Unknown => BaseType::Other,
    }
}

/// Whether a schema node is a keyed list or leaf-list — the only two kinds
/// `find_index`'s binary search applies to (spec.md §4.A/§4.C).
pub fn is_list_like(node: &SchemaNode<'_>) -> bool {
    matches!(node.kind(), SchemaNodeKind::List | SchemaNodeKind::LeafList)
}
