//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Component B: the YANG schema index (spec.md §4.B).
//!
//! Wraps `yang3::context::Context` the way `holo-utils::yang` wraps it for
//! northbound consumption, but exposes the narrower lookup surface the tree,
//! XPath and datastore crates actually need rather than the full protocol
//! plugin data-accessor surface.

pub mod error;
pub mod index;
pub mod order;
pub mod restrict;

pub use error::Error;
pub use index::{is_list_like, YangIndex};
pub use order::YangOrder;
pub use restrict::{BaseType, ResolvedType};
