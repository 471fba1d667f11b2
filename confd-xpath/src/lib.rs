//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Component C: the XPath 1.0 (configuration-selection subset) evaluator
//! (spec.md §4.C). A compile/evaluate split; compiling is pure, evaluating
//! walks a `confd_tree::Tree` and tries the list-key fast path at every step
//! before falling back to a generic walk.

pub mod ast;
pub mod compile;
pub mod error;
pub mod eval;
pub mod fastpath;
pub mod parse;

pub use compile::{compile, CompileCache, Compiled};
pub use error::Error;
pub use eval::{evaluate, evaluate_with_mounts};
pub use fastpath::{try_fast_path, FastPathMatch};
