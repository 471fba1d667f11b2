//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

/// The built-in type a leaf's typedef chain ultimately bottoms out at.
/// A deliberately small subset of `yang3::schema::DataValueType` — just
/// enough to drive the validator's constraint checks (spec.md §4.E,
/// "built-in checks: YANG type constraints").
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BaseType {
    String,
    Int,
    Uint,
    Decimal64,
    Bool,
    Enumeration,
    Binary,
    Leafref,
    Other,
}

/// The resolved, memoised result of [`crate::YangIndex::resolve_type`]: the
/// base type a leaf's typedef chain bottoms out at, after following any
/// leafref indirection down to its first non-leafref target (spec.md §4.B,
/// "type resolution walks typedef chains").
///
/// `yang3`'s compiled schema already merges a typedef chain's own
/// range/length/pattern/fraction-digits restrictions into the single
/// `SchemaLeafType` a leaf exposes — there is no separate typedef-by-typedef
/// chain to walk for those the way there is for leafref indirection. But
/// this binding's `SchemaLeafType` exposes no accessor for the merged
/// restrictions themselves (only `base_type`, `typedef_name` and
/// `leafref_real_type`), so a leaf's range/length/pattern/fraction-digits
/// can't be read back out of it; see DESIGN.md. The validator enforces what
/// the binding does expose: base-type conformance.
#[derive(Clone, Debug)]
pub struct ResolvedType {
    pub base: BaseType,
}
