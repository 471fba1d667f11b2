//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The compiled shape of an XPath 1.0 configuration-selection expression
//! (spec.md §4.C): "a tree over the node kinds Location, Step, NodeTest,
//! Predicate, Expression, Primary".

/// A compiled location path: a sequence of steps applied left to right,
/// each narrowing the working node set.
#[derive(Clone, Debug, Default)]
pub struct Location {
    pub absolute: bool,
    pub steps: Vec<Step>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Axis {
    Child,
    SelfAxis,
    Parent,
    DescendantOrSelf,
}

#[derive(Clone, Debug)]
pub enum NodeTest {
    Name { prefix: Option<String>, local: String },
    Wildcard,
}

#[derive(Clone, Debug)]
pub struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Predicate>,
}

/// One bracketed predicate. `Eq` is the shape the list-key fast path looks
/// for; `Existence` and `Index` fall back to generic evaluation.
#[derive(Clone, Debug)]
pub enum Predicate {
    Index(usize),
    Eq(Primary, Primary),
    Existence(Location),
}

/// A predicate operand (spec.md: `Primary(String|Number|Path|FuncCall)`).
#[derive(Clone, Debug)]
pub enum Primary {
    StringLit(String),
    NumberLit(f64),
    Path(Location),
    FuncCall(String, Vec<Primary>),
}
